use super::Cell;
use std::convert::TryFrom;

/// ## Virtual machine primitive set
///
/// A code field holding one of these numbers runs the primitive. Any
/// larger value in a code field is the address of another code field
/// and is dispatched as a call.
///
/// Compiled definitions start with `DoList`; their bodies are code
/// addresses with inline operands after `DoLit`, `Branch`, `QBranch`
/// and `Next`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    // *** Machine control
    Bye = 0,
    Key,
    TxStore,

    // *** Threading
    DoLit,
    Exit,
    Execute,
    Next,
    QBranch,
    Branch,

    // *** Memory
    Store,
    Fetch,
    CStore,
    CFetch,

    // *** Return stack
    RpFetch,
    RpStore,
    RFrom,
    RFetch,
    ToR,

    // *** Data stack
    SpFetch,
    SpStore,
    Drop,
    Dup,
    Swap,
    Over,

    // *** Logic and arithmetic
    ZeroLess,
    And,
    Or,
    Xor,
    UmPlus,

    // *** Code field handlers
    DoList,
    DoUser,
}

pub const PRIM_COUNT: Cell = 31;

impl Opcode {
    pub const ALL: [Opcode; PRIM_COUNT as usize] = [
        Opcode::Bye,
        Opcode::Key,
        Opcode::TxStore,
        Opcode::DoLit,
        Opcode::Exit,
        Opcode::Execute,
        Opcode::Next,
        Opcode::QBranch,
        Opcode::Branch,
        Opcode::Store,
        Opcode::Fetch,
        Opcode::CStore,
        Opcode::CFetch,
        Opcode::RpFetch,
        Opcode::RpStore,
        Opcode::RFrom,
        Opcode::RFetch,
        Opcode::ToR,
        Opcode::SpFetch,
        Opcode::SpStore,
        Opcode::Drop,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Over,
        Opcode::ZeroLess,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::UmPlus,
        Opcode::DoList,
        Opcode::DoUser,
    ];

    /// The dictionary name of the primitive.
    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            Bye => "BYE",
            Key => "KEY",
            TxStore => "TX!",
            DoLit => "doLIT",
            Exit => "EXIT",
            Execute => "EXECUTE",
            Next => "next",
            QBranch => "?branch",
            Branch => "branch",
            Store => "!",
            Fetch => "@",
            CStore => "C!",
            CFetch => "C@",
            RpFetch => "RP@",
            RpStore => "RP!",
            RFrom => "R>",
            RFetch => "R@",
            ToR => ">R",
            SpFetch => "SP@",
            SpStore => "SP!",
            Drop => "DROP",
            Dup => "DUP",
            Swap => "SWAP",
            Over => "OVER",
            ZeroLess => "0<",
            And => "AND",
            Or => "OR",
            Xor => "XOR",
            UmPlus => "UM+",
            DoList => "doLIST",
            DoUser => "doUSER",
        }
    }
}

impl TryFrom<Cell> for Opcode {
    type Error = Cell;
    fn try_from(cell: Cell) -> Result<Self, Self::Error> {
        Opcode::ALL.get(cell as usize).copied().ok_or(cell)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_matches_table() {
        for (n, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, n);
            assert_eq!(Opcode::try_from(n as Cell), Ok(*op));
        }
        assert_eq!(Opcode::try_from(PRIM_COUNT), Err(PRIM_COUNT));
    }

    #[test]
    fn test_names() {
        assert_eq!(Opcode::TxStore.to_string(), "TX!");
        assert_eq!(Opcode::ZeroLess.name(), "0<");
        assert_eq!(Opcode::DoList.name(), "doLIST");
    }
}
