use super::{
    Cell, Dictionary, Memory, Opcode, Operand, BYTE_MODE, CELLL, EM, LABEL_BASE, RPP, SPP, TIBB,
    UPP,
};
use crate::error;
use crate::lang::{parse, resolve_labels, Definition, Error, Token};
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_ENTRY: &str = "START";

/// Compiles a whole source text and sets PC to `entry`.
pub fn build(source: &str, entry: &str) -> Result<Memory> {
    let mut compiler = Compiler::new()?;
    compiler.compile(source)?;
    compiler.finish(entry)
}

/// Named values usable as operands in kernel source.
fn constant(name: &str) -> Option<Cell> {
    match name {
        "UPP" => Some(UPP),
        "CELLL" => Some(CELLL),
        "CRR" => Some(13),
        "LF" => Some(10),
        "MASKK" => Some(0x7F1F),
        "BKSPP" => Some(8),
        "SPP" => Some(SPP),
        "RPP" => Some(RPP),
        "TIBB" => Some(TIBB),
        "EM" => Some(EM),
        _ => None,
    }
}

fn number(n: i64) -> Result<Operand> {
    if n < -0x8000 || n > 0xFFFF {
        return Err(error!(SyntaxError; format!("NUMBER OUT OF RANGE {}", n)));
    }
    Ok((n as i32 as Cell) as Operand)
}

/// ## Source to dictionary compiler
///
/// Feeds definitions, one per source line, into a `Dictionary`. Every
/// referenced word must already be defined; the first error aborts the
/// build.
pub struct Compiler {
    dict: Dictionary,
    line_number: usize,
}

impl Compiler {
    pub fn new() -> Result<Compiler> {
        Ok(Compiler::with_dictionary(Dictionary::new()?))
    }

    pub fn with_dictionary(dict: Dictionary) -> Compiler {
        Compiler {
            dict,
            line_number: 0,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn compile(&mut self, source: &str) -> Result<()> {
        for line in source.lines() {
            self.enter(line)?;
        }
        Ok(())
    }

    /// Compiles one source line. Errors carry the 1-based line number.
    pub fn enter(&mut self, line: &str) -> Result<()> {
        self.line_number += 1;
        let line_number = Some(self.line_number);
        match parse(line) {
            Ok(Some(definition)) => self
                .define(definition)
                .map_err(|e| e.in_line_number(line_number)),
            Ok(None) => Ok(()),
            Err(e) => Err(e.in_line_number(line_number)),
        }
    }

    pub fn define(&mut self, definition: Definition) -> Result<()> {
        match definition {
            Definition::User(name) => {
                let offset = self.dict.user(&name)?;
                debug!(word = name.as_str(), offset, "user variable");
            }
            Definition::Colon { name, mut body } => {
                body.insert(0, Token::Number(Opcode::DoList as i64));
                self.emit(&name, body)?;
            }
            Definition::Raw { name, body } => {
                self.emit(&name, body)?;
            }
        }
        Ok(())
    }

    fn emit(&mut self, name: &str, body: Vec<Token>) -> Result<()> {
        let code = resolve_labels(body)?;
        let mut operands: Vec<Operand> = Vec::with_capacity(code.len());
        for token in code.iter() {
            operands.push(self.operand(token)?);
        }
        self.dict.colon(name, &operands)?;
        Ok(())
    }

    fn operand(&self, token: &Token) -> Result<Operand> {
        match token {
            Token::Number(n) => number(*n),
            Token::LabelRef(offset) => Ok(LABEL_BASE + *offset as Operand),
            Token::ByteMode => Ok(BYTE_MODE),
            Token::Word(name) => match constant(name) {
                Some(value) => Ok(value as Operand),
                None => Ok(self.dict.lookup(name)? as Operand),
            },
            Token::Label(name) => Err(error!(InternalError; format!("UNRESOLVED LABEL {}", name))),
        }
    }

    /// Points PC at the entry word and hands back the finished image.
    pub fn finish(self, entry: &str) -> Result<Memory> {
        let code = self.dict.lookup(entry)?;
        info!(
            entry,
            code,
            here = self.dict.here(),
            names = self.dict.name_pointer(),
            "dictionary built"
        );
        let mut mem = self.dict.into_memory();
        mem.set_pc(code);
        Ok(mem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::Tags;

    #[test]
    fn test_colon_gets_code_field() {
        let mut c = Compiler::new().unwrap();
        c.enter("NOP EXIT").unwrap();
        let code = c.dictionary().lookup("NOP").unwrap();
        let m = c.dictionary().memory();
        assert_eq!(m.get16(code).unwrap(), Opcode::DoList as Cell);
        assert_eq!(
            m.get16(code + CELLL).unwrap(),
            c.dictionary().lookup("EXIT").unwrap()
        );
    }

    #[test]
    fn test_raw_has_no_code_field() {
        let mut c = Compiler::new().unwrap();
        c.enter("$RAW SEVEN 7 LF").unwrap();
        let code = c.dictionary().lookup("SEVEN").unwrap();
        let m = c.dictionary().memory();
        assert_eq!(m.get16(code).unwrap(), 7);
        assert_eq!(m.get16(code + CELLL).unwrap(), 10);
    }

    #[test]
    fn test_labels_count_code_field() {
        let mut c = Compiler::new().unwrap();
        c.enter("L TOP: branch TOP").unwrap();
        let code = c.dictionary().lookup("L").unwrap();
        let m = c.dictionary().memory();
        // TOP sits after the doLIST cell
        assert_eq!(m.get16(code + 2 * CELLL).unwrap(), code + CELLL);
    }

    #[test]
    fn test_negative_numbers_wrap() {
        let mut c = Compiler::new().unwrap();
        c.enter("$RAW N -1 -32768 65535").unwrap();
        let code = c.dictionary().lookup("N").unwrap();
        let m = c.dictionary().memory();
        assert_eq!(m.get16(code).unwrap(), 0xFFFF);
        assert_eq!(m.get16(code + 2).unwrap(), 0x8000);
        assert_eq!(m.get16(code + 4).unwrap(), 0xFFFF);
    }

    #[test]
    fn test_number_out_of_range() {
        let mut c = Compiler::new().unwrap();
        let e = c.enter("N doLIT 65536").unwrap_err();
        assert_eq!(e.code(), ErrorCode::SyntaxError);
    }

    #[test]
    fn test_error_line_number() {
        let mut c = Compiler::new().unwrap();
        let e = c.compile("\\ kernel\n\nA EXIT\nB NOPE EXIT\n").unwrap_err();
        assert_eq!(e.code(), ErrorCode::UndefinedWord);
        assert_eq!(e.line_number(), Some(4));
        assert_eq!(e.to_string(), "UNDEFINED WORD IN 4; NOPE");
    }

    #[test]
    fn test_forward_reference_between_definitions() {
        let e = build("A B EXIT\nB EXIT\nSTART A BYE", DEFAULT_ENTRY).unwrap_err();
        assert_eq!(e.code(), ErrorCode::UndefinedWord);
        assert_eq!(e.line_number(), Some(1));
    }

    #[test]
    fn test_user_lines() {
        let mut c = Compiler::new().unwrap();
        c.compile("$USER CP\n$USER\n$USER SP0").unwrap();
        assert_eq!(c.dictionary().user_offset(), 6);
        let code = c.dictionary().lookup("SP0").unwrap();
        assert_eq!(c.dictionary().memory().get16(code + CELLL).unwrap(), 4);
    }

    #[test]
    fn test_finish_sets_pc() {
        let mem = build("START BYE", DEFAULT_ENTRY).unwrap();
        let mut c = Compiler::new().unwrap();
        c.enter("START BYE").unwrap();
        assert_eq!(mem.pc(), c.dictionary().lookup("START").unwrap());
        assert!(build("GO BYE", DEFAULT_ENTRY).is_err());
        assert!(build("GO BYE", "GO").is_ok());
    }

    #[test]
    fn test_enter_after_failed_line() {
        let dict = Dictionary::with_tags(Memory::new(), Tags::default().immediate("THEN")).unwrap();
        let mut c = Compiler::with_dictionary(dict);
        let e = c.enter("MSG $B 72 300 $B").unwrap_err();
        assert_eq!(e.code(), ErrorCode::Overflow);
        assert!(c.dictionary().find("MSG").unwrap().is_none());
        c.enter("THEN EXIT").unwrap();
        let header = c.dictionary().find("THEN").unwrap().unwrap();
        assert!(header.is_immediate());
        assert!(!header.is_compile_only());
        let m = c.dictionary().memory();
        assert_eq!(m.get16(header.code).unwrap(), Opcode::DoList as Cell);
    }
}
