//! Dimension parsing
//!
//! Accepts a compact `WxH` query (`400x300`, `400x`, `x300`) or discrete
//! `width=`/`height=` parameters. Named parameters only fill a side the
//! compact form left empty.

use std::borrow::Cow;

use url::form_urlencoded;

use super::error::DimensionError;

/// Requested output size; `None` on a side means "derive from aspect ratio"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl DimensionRequest {
    /// No dimension given: serve the original size
    pub const fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Width and height with `0` standing for "derive from the other side"
    pub fn as_pair(&self) -> (u32, u32) {
        (self.width.unwrap_or(0), self.height.unwrap_or(0))
    }

    /// Reject sides larger than `max`
    pub fn validate(&self, max: u32) -> Result<(), DimensionError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value.filter(|v| *v > max) {
                return Err(DimensionError::TooLarge { name, value, max });
            }
        }
        Ok(())
    }
}

/// Split a raw query on its first `x`
///
/// Returns empty tokens when there is no `x` at all.
pub fn split_compact(query: &str) -> (&str, &str) {
    query.split_once('x').unwrap_or(("", ""))
}

/// Parse the raw (undecoded) query string of a request
pub fn parse_dimensions(raw_query: Option<&str>) -> Result<DimensionRequest, DimensionError> {
    let query = raw_query.unwrap_or("");
    let (compact_width, compact_height) = split_compact(query);

    let width = pick_token(compact_width, query, "width");
    let height = pick_token(compact_height, query, "height");

    Ok(DimensionRequest {
        width: parse_token("width", width.as_deref())?,
        height: parse_token("height", height.as_deref())?,
    })
}

/// Compact token if present, otherwise the first named parameter
fn pick_token<'a>(compact: &'a str, query: &'a str, name: &str) -> Option<Cow<'a, str>> {
    if !compact.is_empty() {
        return Some(Cow::Borrowed(compact));
    }
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn parse_token(name: &'static str, token: Option<&str>) -> Result<Option<u32>, DimensionError> {
    let Some(token) = token else {
        return Ok(None);
    };
    let value = token.parse::<u32>().map_err(|_| DimensionError::Invalid {
        name,
        value: token.to_string(),
    })?;
    // Zero is the aspect-ratio sentinel, same as leaving the side out
    Ok((value != 0).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: Option<u32>, height: Option<u32>) -> DimensionRequest {
        DimensionRequest { width, height }
    }

    #[test]
    fn test_split_compact() {
        assert_eq!(split_compact("400x300"), ("400", "300"));
        assert_eq!(split_compact("400x"), ("400", ""));
        assert_eq!(split_compact("x300"), ("", "300"));
        assert_eq!(split_compact(""), ("", ""));
        assert_eq!(split_compact("1x2x3"), ("1", "2x3"));
    }

    #[test]
    fn test_compact_forms() {
        assert_eq!(parse_dimensions(Some("400x300")), Ok(dims(Some(400), Some(300))));
        assert_eq!(parse_dimensions(Some("400x")), Ok(dims(Some(400), None)));
        assert_eq!(parse_dimensions(Some("x300")), Ok(dims(None, Some(300))));
    }

    #[test]
    fn test_named_parameters() {
        assert_eq!(
            parse_dimensions(Some("width=640&height=480")),
            Ok(dims(Some(640), Some(480)))
        );
        assert_eq!(parse_dimensions(Some("height=120")), Ok(dims(None, Some(120))));
        assert_eq!(parse_dimensions(Some("width=&height=")), Ok(dims(None, None)));
    }

    #[test]
    fn test_absent_means_original() {
        assert!(parse_dimensions(None).unwrap().is_empty());
        assert!(parse_dimensions(Some("")).unwrap().is_empty());
        assert!(parse_dimensions(Some("foo=bar")).unwrap().is_empty());
    }

    #[test]
    fn test_zero_is_absent() {
        assert_eq!(parse_dimensions(Some("0x200")), Ok(dims(None, Some(200))));
        assert!(parse_dimensions(Some("0x0")).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(
            parse_dimensions(Some("abcx100")),
            Err(DimensionError::Invalid {
                name: "width",
                value: "abc".to_string()
            })
        );
        assert!(parse_dimensions(Some("100x-5")).is_err());
        assert!(parse_dimensions(Some("width=big")).is_err());
        // Compact form claims the query, so the remainder is the height token
        assert!(parse_dimensions(Some("400x&height=50")).is_err());
    }

    #[test]
    fn test_validate_max_dimension() {
        assert!(dims(Some(4096), Some(4096)).validate(4096).is_ok());
        assert_eq!(
            dims(None, Some(5000)).validate(4096),
            Err(DimensionError::TooLarge {
                name: "height",
                value: 5000,
                max: 4096
            })
        );
    }

    #[test]
    fn test_as_pair() {
        assert_eq!(dims(Some(10), None).as_pair(), (10, 0));
        assert_eq!(dims(None, None).as_pair(), (0, 0));
    }
}
