/// Module defining the EVM opcode enumeration used by the decoder.
///
/// The table covers the Cancun instruction set. Every byte value maps to exactly one `Opcode`:
/// recognised instructions get their own variant, the variable families (`PUSH1..PUSH32`,
/// `DUP`, `SWAP`, `LOG`) carry their index, and anything else becomes `Unknown(byte)` so that
/// decoding never has to stop on unrecognised input.
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a mnemonic does not name an EVM instruction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mnemonic '{0}'")]
pub struct ParseOpcodeError(pub String);

macro_rules! opcodes {
    ($($name:ident = $byte:literal),* $(,)?) => {
        /// Enumeration of EVM opcodes.
        ///
        /// Fixed single-byte instructions are listed by name. `PUSH(n)` is `PUSH1..PUSH32` and
        /// is the only family carrying an operand; `PUSH0` has none. `Unknown(byte)` is the
        /// sentinel for bytes outside the instruction set.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $( $name, )*
            PUSH(u8),
            DUP(u8),
            SWAP(u8),
            LOG(u8),
            Unknown(u8),
        }

        impl Opcode {
            /// Parses a raw byte into an `Opcode` and the number of operand bytes that follow it.
            ///
            /// # Examples
            /// ```rust
            /// use sysprobe_core::Opcode;
            ///
            /// assert_eq!(Opcode::parse(0x61), (Opcode::PUSH(2), 2));
            /// assert_eq!(Opcode::parse(0x5f), (Opcode::PUSH0, 0));
            /// assert_eq!(Opcode::parse(0x0c), (Opcode::Unknown(0x0c), 0));
            /// ```
            pub const fn parse(byte: u8) -> (Self, usize) {
                match byte {
                    0x60..=0x7f => {
                        let n = byte - 0x5f;
                        (Self::PUSH(n), n as usize)
                    }
                    0x80..=0x8f => (Self::DUP(byte - 0x7f), 0),
                    0x90..=0x9f => (Self::SWAP(byte - 0x8f), 0),
                    0xa0..=0xa4 => (Self::LOG(byte - 0xa0), 0),
                    $( $byte => (Self::$name, 0), )*
                    other => (Self::Unknown(other), 0),
                }
            }

            /// Converts the opcode back to its byte value.
            pub const fn to_byte(&self) -> u8 {
                match self {
                    $( Self::$name => $byte, )*
                    Self::PUSH(n) => 0x5f + *n,
                    Self::DUP(n) => 0x7f + *n,
                    Self::SWAP(n) => 0x8f + *n,
                    Self::LOG(n) => 0xa0 + *n,
                    Self::Unknown(byte) => *byte,
                }
            }

            const fn fixed_name(&self) -> Option<&'static str> {
                match self {
                    $( Self::$name => Some(stringify!($name)), )*
                    _ => None,
                }
            }

            fn from_fixed_name(name: &str) -> Option<Self> {
                match name {
                    $( stringify!($name) => Some(Self::$name), )*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    // 0x range - stop & arithmetic
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0a,
    SIGNEXTEND = 0x0b,
    // 10x range - comparison & bitwise logic
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1a,
    SHL = 0x1b,
    SHR = 0x1c,
    SAR = 0x1d,
    // 20x range - hashing
    SHA3 = 0x20,
    // 30x range - environment
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3a,
    EXTCODESIZE = 0x3b,
    EXTCODECOPY = 0x3c,
    RETURNDATASIZE = 0x3d,
    RETURNDATACOPY = 0x3e,
    EXTCODEHASH = 0x3f,
    // 40x range - block information
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    PREVRANDAO = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,
    BLOBHASH = 0x49,
    BLOBBASEFEE = 0x4a,
    // 50x range - stack, memory, storage & flow
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5a,
    JUMPDEST = 0x5b,
    TLOAD = 0x5c,
    TSTORE = 0x5d,
    MCOPY = 0x5e,
    PUSH0 = 0x5f,
    // f0x range - system
    CREATE = 0xf0,
    CALL = 0xf1,
    CALLCODE = 0xf2,
    RETURN = 0xf3,
    DELEGATECALL = 0xf4,
    CREATE2 = 0xf5,
    STATICCALL = 0xfa,
    REVERT = 0xfd,
    INVALID = 0xfe,
    SELFDESTRUCT = 0xff,
}

/// Prefix of the sentinel mnemonic given to bytes outside the instruction set.
pub const UNKNOWN_MNEMONIC: &str = "UNKNOWN";

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PUSH(n) => write!(f, "PUSH{n}"),
            Self::DUP(n) => write!(f, "DUP{n}"),
            Self::SWAP(n) => write!(f, "SWAP{n}"),
            Self::LOG(n) => write!(f, "LOG{n}"),
            Self::Unknown(byte) => write!(f, "{UNKNOWN_MNEMONIC}_0x{byte:02x}"),
            fixed => f.write_str(fixed.fixed_name().unwrap_or(UNKNOWN_MNEMONIC)),
        }
    }
}

impl FromStr for Opcode {
    type Err = ParseOpcodeError;

    /// Parses a mnemonic such as `PUSH4`, `CALL` or `UNKNOWN_0x0c`.
    ///
    /// `KECCAK256` and `DIFFICULTY` are accepted as aliases of `SHA3` and `PREVRANDAO`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let err = || ParseOpcodeError(s.to_string());

        if let Some(op) = Self::from_fixed_name(&upper) {
            return Ok(op);
        }
        match upper.as_str() {
            "KECCAK256" => return Ok(Self::SHA3),
            "DIFFICULTY" => return Ok(Self::PREVRANDAO),
            _ => {}
        }

        let indexed = |prefix: &str, range: std::ops::RangeInclusive<u8>| {
            upper
                .strip_prefix(prefix)
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| range.contains(n))
        };
        if let Some(n) = indexed("PUSH", 1..=32) {
            return Ok(Self::PUSH(n));
        }
        if let Some(n) = indexed("DUP", 1..=16) {
            return Ok(Self::DUP(n));
        }
        if let Some(n) = indexed("SWAP", 1..=16) {
            return Ok(Self::SWAP(n));
        }
        if let Some(n) = indexed("LOG", 0..=4) {
            return Ok(Self::LOG(n));
        }

        let byte = upper
            .strip_prefix("UNKNOWN_0X")
            .and_then(|b| u8::from_str_radix(b, 16).ok())
            .ok_or_else(err)?;
        match Self::parse(byte) {
            (Self::Unknown(b), _) => Ok(Self::Unknown(b)),
            _ => Err(err()),
        }
    }
}

impl Opcode {
    /// Number of operand bytes the opcode declares (1..=32 for `PUSHn`, 0 otherwise).
    pub const fn push_width(&self) -> usize {
        match self {
            Self::PUSH(n) => *n as usize,
            _ => 0,
        }
    }

    /// Returns true for the literal-push family, including `PUSH0`.
    pub const fn is_push(&self) -> bool {
        matches!(self, Self::PUSH(_) | Self::PUSH0)
    }

    /// Returns true only for a plain `CALL`; the other call-family opcodes do not count.
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::CALL)
    }

    /// Returns true for the sentinel produced by unrecognised bytes.
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}
