use super::*;

#[test]
fn test_backward_label() {
    let code = resolve_labels(body("TOP: DUP ?branch TOP EXIT")).unwrap();
    assert_eq!(
        code,
        vec![
            Token::Word("DUP".into()),
            Token::Word("?branch".into()),
            Token::LabelRef(0),
            Token::Word("EXIT".into()),
        ]
    );
}

#[test]
fn test_forward_label() {
    let code = resolve_labels(body("DUP ?branch QDUP1 DUP QDUP1: EXIT")).unwrap();
    assert_eq!(code[2], Token::LabelRef(8));
    assert_eq!(code.len(), 5);
}

#[test]
fn test_byte_mode_offsets() {
    // three bytes then realign: the label after the span sits on a cell
    let code = resolve_labels(body("doLIT MSG $B MSG: 2 72 73 $B AFTER: EXIT AFTER")).unwrap();
    assert_eq!(code[1], Token::LabelRef(4));
    assert_eq!(code[8], Token::LabelRef(8));
}

#[test]
fn test_label_shadows_word() {
    let code = resolve_labels(body("DUP: DUP")).unwrap();
    assert_eq!(code, vec![Token::LabelRef(0)]);
}

#[test]
fn test_duplicate_label() {
    let e = resolve_labels(body("A: DUP A: DROP")).unwrap_err();
    assert_eq!(e.code(), ErrorCode::SyntaxError);
}

#[test]
fn test_labels_are_local() {
    let first = resolve_labels(body("L: branch L")).unwrap();
    assert_eq!(first[1], Token::LabelRef(0));
    let second = resolve_labels(body("branch L")).unwrap();
    assert_eq!(second[1], Token::Word("L".into()));
}
