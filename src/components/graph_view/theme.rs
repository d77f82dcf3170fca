//! Colors used by shapes and view options.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Returned when a string is not a supported CSS color.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("unsupported color `{0}`")]
pub struct ParseColorError(String);

/// Parses `#RGB`, `#RRGGBB` and `rgb()`/`rgba()` functional notation.
impl FromStr for Color {
	type Err = ParseColorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ParseColorError(s.to_string());
		let s = s.trim();

		if let Some(hex) = s.strip_prefix('#') {
			if !hex.is_ascii() {
				return Err(err());
			}
			let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
			return match hex.len() {
				6 => Ok(Color::rgb(
					channel(&hex[0..2])?,
					channel(&hex[2..4])?,
					channel(&hex[4..6])?,
				)),
				3 => {
					let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
					Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => Err(err()),
			};
		}

		if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			if !(3..=4).contains(&nums.len()) {
				return Err(err());
			}
			let channel = |i: usize| nums[i].parse::<u8>().map_err(|_| err());
			let a = match nums.get(3) {
				Some(a) => a.parse::<f64>().map_err(|_| err())?,
				None => 1.0,
			};
			return Ok(Color::rgba(channel(0)?, channel(1)?, channel(2)?, a));
		}

		Err(err())
	}
}

impl TryFrom<String> for Color {
	type Error = ParseColorError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_notations() {
		assert_eq!("#69C0FF".parse(), Ok(Color::rgb(0x69, 0xc0, 0xff)));
		assert_eq!("#fff".parse(), Ok(Color::WHITE));
		assert_eq!(
			"rgba(0,0,0,.15)".parse(),
			Ok(Color::rgba(0, 0, 0, 0.15))
		);
		assert_eq!("rgb(1, 2, 3)".parse(), Ok(Color::rgb(1, 2, 3)));
		assert!("fff".parse::<Color>().is_err());
		assert!("#12345".parse::<Color>().is_err());
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(0xcc, 0xcc, 0xcc).to_css(), "#cccccc");
		assert_eq!(Color::rgb(0, 0, 0).with_alpha(0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}

	#[test]
	fn deserializes_from_string() {
		let color: Color = serde_json::from_str("\"#F6F6F6\"").unwrap();
		assert_eq!(color, Color::rgb(0xf6, 0xf6, 0xf6));
		assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
	}

	#[test]
	fn parse_error_names_the_input() {
		let err = "#zzz".parse::<Color>().unwrap_err();
		assert_eq!(err, ParseColorError("#zzz".into()));
		assert_eq!(err.to_string(), "unsupported color `#zzz`");
		let _: &dyn std::error::Error = &err;
	}
}
