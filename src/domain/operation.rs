use std::fmt;

use super::{Units, parse_units};

/// The closed set of ledger operations. Raw `(function, args)` pairs coming
/// from the invocation surface are decoded into this enum exactly once, at
/// the boundary, so everything past decoding works with validated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Approve {
        applicant: String,
        amount: Units,
    },
    Transfer {
        sender: String,
        receiver: String,
        amount: Units,
    },
    Read {
        owner: String,
    },
}

impl Operation {
    /// Decode a mutating invocation: `approve` or `transfer`.
    pub fn decode_invoke(function: &str, args: &[String]) -> Result<Self, DecodeError> {
        match function {
            "approve" => {
                expect_args(function, 2, args)?;
                Ok(Operation::Approve {
                    applicant: identifier("applicant", &args[0])?,
                    amount: amount(&args[1])?,
                })
            }
            "transfer" => {
                expect_args(function, 3, args)?;
                let sender = identifier("sender", &args[0])?;
                let receiver = identifier("receiver", &args[1])?;
                if sender == receiver {
                    return Err(DecodeError::SameOwner(sender));
                }
                Ok(Operation::Transfer {
                    sender,
                    receiver,
                    amount: amount(&args[2])?,
                })
            }
            other => Err(DecodeError::UnknownFunction(other.to_string())),
        }
    }

    /// Decode a read-only query: `read`.
    pub fn decode_query(function: &str, args: &[String]) -> Result<Self, DecodeError> {
        match function {
            "read" => {
                expect_args(function, 1, args)?;
                Ok(Operation::Read {
                    owner: identifier("owner", &args[0])?,
                })
            }
            other => Err(DecodeError::UnknownFunction(other.to_string())),
        }
    }
}

fn expect_args(function: &str, expected: usize, args: &[String]) -> Result<(), DecodeError> {
    if args.len() != expected {
        return Err(DecodeError::ArgumentCount {
            function: function.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn identifier(role: &'static str, value: &str) -> Result<String, DecodeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DecodeError::EmptyIdentifier(role));
    }
    Ok(value.to_string())
}

fn amount(value: &str) -> Result<Units, DecodeError> {
    let units = parse_units(value).map_err(|_| DecodeError::InvalidAmount(value.to_string()))?;
    if units <= 0 {
        return Err(DecodeError::NonPositiveAmount(units));
    }
    Ok(units)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    UnknownFunction(String),
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },
    EmptyIdentifier(&'static str),
    InvalidAmount(String),
    NonPositiveAmount(Units),
    SameOwner(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownFunction(name) => {
                write!(f, "received unknown function: {}", name)
            }
            DecodeError::ArgumentCount {
                function,
                expected,
                got,
            } => {
                write!(
                    f,
                    "'{}' expects {} argument(s), got {}",
                    function, expected, got
                )
            }
            DecodeError::EmptyIdentifier(role) => {
                write!(f, "{} identifier must not be empty", role)
            }
            DecodeError::InvalidAmount(value) => {
                write!(f, "invalid amount '{}': expected an integer", value)
            }
            DecodeError::NonPositiveAmount(units) => {
                write!(f, "amount must be positive, got {}", units)
            }
            DecodeError::SameOwner(owner) => {
                write!(f, "sender and receiver must differ, both are '{}'", owner)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_approve() {
        let op = Operation::decode_invoke("approve", &args(&["alice", "300"])).unwrap();
        assert_eq!(
            op,
            Operation::Approve {
                applicant: "alice".to_string(),
                amount: 300
            }
        );
    }

    #[test]
    fn test_decode_transfer() {
        let op = Operation::decode_invoke("transfer", &args(&["alice", "bob", "50"])).unwrap();
        assert_eq!(
            op,
            Operation::Transfer {
                sender: "alice".to_string(),
                receiver: "bob".to_string(),
                amount: 50
            }
        );
    }

    #[test]
    fn test_decode_read() {
        let op = Operation::decode_query("read", &args(&["alice"])).unwrap();
        assert_eq!(
            op,
            Operation::Read {
                owner: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            Operation::decode_invoke("delete", &args(&["alice"])),
            Err(DecodeError::UnknownFunction(_))
        ));
        // `read` lives on the query surface, not the invoke surface.
        assert!(matches!(
            Operation::decode_invoke("read", &args(&["alice"])),
            Err(DecodeError::UnknownFunction(_))
        ));
        assert!(matches!(
            Operation::decode_query("approve", &args(&["alice", "300"])),
            Err(DecodeError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_argument_count() {
        assert!(matches!(
            Operation::decode_invoke("approve", &args(&["alice"])),
            Err(DecodeError::ArgumentCount {
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert!(matches!(
            Operation::decode_query("read", &args(&[])),
            Err(DecodeError::ArgumentCount {
                expected: 1,
                got: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_amounts() {
        assert!(matches!(
            Operation::decode_invoke("approve", &args(&["alice", "lots"])),
            Err(DecodeError::InvalidAmount(_))
        ));
        assert!(matches!(
            Operation::decode_invoke("approve", &args(&["alice", "0"])),
            Err(DecodeError::NonPositiveAmount(0))
        ));
        assert!(matches!(
            Operation::decode_invoke("transfer", &args(&["alice", "bob", "-10"])),
            Err(DecodeError::NonPositiveAmount(-10))
        ));
    }

    #[test]
    fn test_empty_identifier() {
        assert!(matches!(
            Operation::decode_invoke("approve", &args(&["  ", "300"])),
            Err(DecodeError::EmptyIdentifier("applicant"))
        ));
    }

    #[test]
    fn test_self_transfer_rejected() {
        assert!(matches!(
            Operation::decode_invoke("transfer", &args(&["alice", "alice", "10"])),
            Err(DecodeError::SameOwner(_))
        ));
    }
}
