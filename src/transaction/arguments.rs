use super::Error;
use bigdecimal::{
    num_bigint::{BigInt, Sign},
    BigDecimal,
};
use ethabi::{ethereum_types::U256, Address, ParamType, Token};
use serde_json::Value;
use std::str::FromStr;

/// A call argument as decoded from its JSON representation.
///
/// Top-level numbers become arbitrary-precision integers so that values
/// above 2^53 keep every digit. Everything else is kept as parsed JSON
/// and interpreted later against the declared ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Integer(BigInt),
    Json(Value),
}

pub fn decode_arguments(args: &[String]) -> Result<Vec<Argument>, Error> {
    args.iter()
        .enumerate()
        .map(|(index, raw)| {
            decode_argument(raw).map_err(|reason| Error::ArgumentDecode {
                index,
                raw: raw.clone(),
                reason,
            })
        })
        .collect()
}

fn decode_argument(raw: &str) -> Result<Argument, String> {
    let value: Value = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    match value {
        Value::Number(number) => parse_integer_literal(&number.to_string()).map(Argument::Integer),
        other => Ok(Argument::Json(other)),
    }
}

/// Converts a decoded argument into an ABI token of the given type.
pub fn tokenize(kind: &ParamType, argument: &Argument) -> Result<Token, String> {
    match argument {
        Argument::Integer(value) => integer_token(kind, value),
        Argument::Json(value) => tokenize_value(kind, value),
    }
}

fn tokenize_value(kind: &ParamType, value: &Value) -> Result<Token, String> {
    match (kind, value) {
        (ParamType::Uint(_) | ParamType::Int(_), Value::Number(number)) => {
            integer_token(kind, &parse_integer_literal(&number.to_string())?)
        }
        (ParamType::Uint(_) | ParamType::Int(_), Value::String(literal)) => {
            integer_token(kind, &parse_integer_string(literal)?)
        }
        (ParamType::Address, Value::String(literal)) => {
            let bytes = decode_hex(literal)?;
            if bytes.len() != Address::len_bytes() {
                return Err(format!("{literal:?} is not a 20 bytes address"));
            }
            Ok(Token::Address(Address::from_slice(&bytes)))
        }
        (ParamType::Bytes, Value::String(literal)) => Ok(Token::Bytes(decode_hex(literal)?)),
        (ParamType::FixedBytes(size), Value::String(literal)) => {
            if *size == 0 || *size > 32 {
                return Err(format!("`{kind}` is not a valid fixed bytes type"));
            }
            let bytes = decode_hex(literal)?;
            if bytes.len() != *size {
                return Err(format!("{literal:?} is not {size} bytes long"));
            }
            Ok(Token::FixedBytes(bytes))
        }
        (ParamType::Bool, Value::Bool(value)) => Ok(Token::Bool(*value)),
        (ParamType::String, Value::String(value)) => Ok(Token::String(value.clone())),
        (ParamType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| tokenize_value(inner, item))
            .collect::<Result<_, _>>()
            .map(Token::Array),
        (ParamType::FixedArray(inner, size), Value::Array(items)) => {
            if items.len() != *size {
                return Err(format!(
                    "`{kind}` expects {size} elements, got {}",
                    items.len()
                ));
            }
            items
                .iter()
                .map(|item| tokenize_value(inner, item))
                .collect::<Result<_, _>>()
                .map(Token::FixedArray)
        }
        (ParamType::Tuple(kinds), Value::Array(items)) => {
            if items.len() != kinds.len() {
                return Err(format!(
                    "`{kind}` expects {} components, got {}",
                    kinds.len(),
                    items.len()
                ));
            }
            kinds
                .iter()
                .zip(items)
                .map(|(kind, item)| tokenize_value(kind, item))
                .collect::<Result<_, _>>()
                .map(Token::Tuple)
        }
        (kind, value) => Err(format!("{value} cannot be used as `{kind}`")),
    }
}

fn integer_token(kind: &ParamType, value: &BigInt) -> Result<Token, String> {
    if let ParamType::Uint(bits) | ParamType::Int(bits) = kind {
        if *bits == 0 || *bits > 256 || bits % 8 != 0 {
            return Err(format!("`{kind}` is not a valid integer type"));
        }
    }
    match kind {
        ParamType::Uint(bits) => to_uint(value, *bits).map(Token::Uint),
        ParamType::Int(bits) => to_int(value, *bits).map(Token::Int),
        other => Err(format!("integer {value} cannot be used as `{other}`")),
    }
}

fn to_uint(value: &BigInt, bits: usize) -> Result<U256, String> {
    if value.sign() == Sign::Minus {
        return Err(format!("{value} is negative but `uint{bits}` is unsigned"));
    }
    if value.bits() > bits as u64 {
        return Err(format!("{value} does not fit into `uint{bits}`"));
    }
    Ok(U256::from_big_endian(&value.to_bytes_be().1))
}

fn to_int(value: &BigInt, bits: usize) -> Result<U256, String> {
    let bound = BigInt::from(1u8) << (bits - 1);
    if *value >= bound || *value < -&bound {
        return Err(format!("{value} does not fit into `int{bits}`"));
    }
    // two's complement over the whole 256-bit word
    let encoded = match value.sign() {
        Sign::Minus => (BigInt::from(1u8) << 256usize) + value,
        _ => value.clone(),
    };
    Ok(U256::from_big_endian(&encoded.to_bytes_be().1))
}

fn parse_integer_literal(literal: &str) -> Result<BigInt, String> {
    let decimal = BigDecimal::from_str(literal).map_err(|err| format!("{literal:?}: {err}"))?;
    if !decimal.is_integer() {
        return Err(format!("{literal} is not an integer"));
    }
    let (integer, _) = decimal.with_scale(0).into_bigint_and_exponent();
    Ok(integer)
}

fn parse_integer_string(literal: &str) -> Result<BigInt, String> {
    match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(digits) => BigInt::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| format!("{literal:?} is not a hex integer")),
        None => parse_integer_literal(literal),
    }
}

fn decode_hex(literal: &str) -> Result<Vec<u8>, String> {
    hex::decode(literal.strip_prefix("0x").unwrap_or(literal))
        .map_err(|err| format!("{literal:?} is not valid hex: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn numbers_become_integers() {
        let decoded = decode_arguments(&args(&["100"])).unwrap();
        assert_eq!(decoded, vec![Argument::Integer(BigInt::from(100))]);
    }

    #[test]
    fn strings_stay_strings() {
        let decoded = decode_arguments(&args(&["\"abc\""])).unwrap();
        assert_eq!(decoded, vec![Argument::Json(json!("abc"))]);
    }

    #[test]
    fn large_numbers_keep_precision() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let decoded = decode_arguments(&args(&[max, "9007199254740993"])).unwrap();
        assert_eq!(
            decoded,
            vec![
                Argument::Integer(BigInt::from_str(max).unwrap()),
                Argument::Integer(BigInt::from(9007199254740993u64)),
            ]
        );
    }

    #[test]
    fn exponent_notation_is_accepted_for_integers() {
        let decoded = decode_arguments(&args(&["1e3"])).unwrap();
        assert_eq!(decoded, vec![Argument::Integer(BigInt::from(1000))]);
    }

    #[test]
    fn decode_errors_name_the_argument() {
        let err = decode_arguments(&args(&["1", "not json"])).unwrap_err();
        assert!(
            matches!(&err, Error::ArgumentDecode { index: 1, raw, .. } if raw == "not json"),
            "unexpected error: {err}"
        );

        let err = decode_arguments(&args(&["1.5"])).unwrap_err();
        assert!(
            matches!(err, Error::ArgumentDecode { index: 0, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn integers_are_range_checked() {
        let uint8 = ParamType::Uint(8);
        assert_eq!(
            tokenize(&uint8, &Argument::Integer(BigInt::from(255))).unwrap(),
            Token::Uint(U256::from(255))
        );
        assert!(tokenize(&uint8, &Argument::Integer(BigInt::from(256))).is_err());
        assert!(tokenize(&uint8, &Argument::Integer(BigInt::from(-1))).is_err());

        let int8 = ParamType::Int(8);
        assert_eq!(
            tokenize(&int8, &Argument::Integer(BigInt::from(-1))).unwrap(),
            Token::Int(U256::MAX)
        );
        assert_eq!(
            tokenize(&int8, &Argument::Integer(BigInt::from(-128))).unwrap(),
            Token::Int(U256::MAX - U256::from(127))
        );
        assert!(tokenize(&int8, &Argument::Integer(BigInt::from(128))).is_err());
        assert!(tokenize(&int8, &Argument::Integer(BigInt::from(-129))).is_err());
    }

    #[test]
    fn invalid_integer_widths_are_rejected() {
        let wide = Argument::Integer(BigInt::from(1u8) << 300usize);
        for kind in [
            ParamType::Uint(512),
            ParamType::Int(512),
            ParamType::Int(0),
            ParamType::Uint(0),
            ParamType::Uint(7),
        ] {
            assert!(tokenize(&kind, &wide).is_err(), "{kind}");
            let zero = Argument::Integer(BigInt::from(0));
            assert!(tokenize(&kind, &zero).is_err(), "{kind}");
            let hex = Argument::Json(json!("0x1"));
            assert!(tokenize(&kind, &hex).is_err(), "{kind}");
        }
        assert!(tokenize(&ParamType::FixedBytes(33), &Argument::Json(json!("0x00"))).is_err());
    }

    #[test]
    fn nested_values_follow_declared_types() {
        let kind = ParamType::Tuple(vec![
            ParamType::Array(Box::new(ParamType::Uint(256))),
            ParamType::Address,
            ParamType::Bool,
            ParamType::FixedBytes(2),
        ]);
        let value = json!([
            [1, "0x10", "340282366920938463463374607431768211456"],
            "0x8cdaf0cd259887258bc13a92c0a6da92698644c0",
            true,
            "0xbeef"
        ]);

        let token = tokenize(&kind, &Argument::Json(value)).unwrap();

        let expected = Token::Tuple(vec![
            Token::Array(vec![
                Token::Uint(U256::one()),
                Token::Uint(U256::from(16)),
                Token::Uint(U256::one() << 128),
            ]),
            Token::Address(Address::from_slice(
                &hex::decode("8cdaf0cd259887258bc13a92c0a6da92698644c0").unwrap(),
            )),
            Token::Bool(true),
            Token::FixedBytes(vec![0xbe, 0xef]),
        ]);
        assert_eq!(token, expected);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        assert!(tokenize(&ParamType::Bool, &Argument::Json(json!("true"))).is_err());
        assert!(tokenize(&ParamType::Address, &Argument::Json(json!("0x1234"))).is_err());
        assert!(tokenize(&ParamType::String, &Argument::Integer(BigInt::from(1))).is_err());
        assert!(tokenize(
            &ParamType::FixedArray(Box::new(ParamType::Bool), 2),
            &Argument::Json(json!([true]))
        )
        .is_err());
    }
}
