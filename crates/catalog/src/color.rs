use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, ValueObject};

use crate::variation::Attributes;

/// A named display color from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    name: String,
    hex_code: String,
}

impl Color {
    /// `hex_code` must be `#RRGGBB`.
    pub fn new(name: impl Into<String>, hex_code: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let hex_code = hex_code.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("color name cannot be empty"));
        }
        let valid = hex_code.len() == 7
            && hex_code.starts_with('#')
            && hex_code[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(DomainError::validation(format!(
                "invalid hex code '{hex_code}' for color '{name}'"
            )));
        }
        Ok(Self { name, hex_code })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hex_code(&self) -> &str {
        &self.hex_code
    }
}

impl ValueObject for Color {}

/// Color reference table, looked up case-insensitively by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSet {
    colors: Vec<Color>,
}

impl ColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn insert(&mut self, color: Color) {
        // Last write wins for a name, matching admin edits of the table.
        self.colors
            .retain(|c| !c.name.eq_ignore_ascii_case(&color.name));
        self.colors.push(color);
    }

    pub fn lookup(&self, name: &str) -> Option<&Color> {
        self.colors
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a variation's well-known `Color` attribute to a display hex
    /// code. Both the attribute key and the table lookup are case-insensitive;
    /// attributes are otherwise opaque passthrough data.
    pub fn display_hex(&self, attributes: &Attributes) -> Option<&str> {
        let value = attributes.get_ignore_case("Color")?;
        self.lookup(value).map(Color::hex_code)
    }
}
