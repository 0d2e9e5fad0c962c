//! Coupon input discovery

use super::{InputField, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttribute {
    Name,
    Id,
    Placeholder,
}

impl FieldAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldAttribute::Name => "name",
            FieldAttribute::Id => "id",
            FieldAttribute::Placeholder => "placeholder",
        }
    }
}

/// `input[attr*="needle"]`, optionally with the `i` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelector {
    pub attribute: FieldAttribute,
    pub needle: &'static str,
    pub case_insensitive: bool,
}

impl FieldSelector {
    const fn exact(attribute: FieldAttribute, needle: &'static str) -> Self {
        Self {
            attribute,
            needle,
            case_insensitive: false,
        }
    }

    const fn folded(attribute: FieldAttribute, needle: &'static str) -> Self {
        Self {
            attribute,
            needle,
            case_insensitive: true,
        }
    }

    pub fn matches(&self, field: &InputField) -> bool {
        match field.attribute(self.attribute) {
            Some(value) if self.case_insensitive => value
                .to_ascii_lowercase()
                .contains(&self.needle.to_ascii_lowercase()),
            Some(value) => value.contains(self.needle),
            None => false,
        }
    }
}

impl std::fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input[{}*=\"{}\"", self.attribute.as_str(), self.needle)?;
        if self.case_insensitive {
            write!(f, " i")?;
        }
        write!(f, "]")
    }
}

/// Selectors in priority order. `name` and `id` match case-sensitively,
/// `placeholder` ignores case.
pub static COUPON_FIELD_SELECTORS: [FieldSelector; 6] = [
    FieldSelector::exact(FieldAttribute::Name, "coupon"),
    FieldSelector::exact(FieldAttribute::Name, "promo"),
    FieldSelector::exact(FieldAttribute::Id, "coupon"),
    FieldSelector::exact(FieldAttribute::Id, "promo"),
    FieldSelector::folded(FieldAttribute::Placeholder, "coupon"),
    FieldSelector::folded(FieldAttribute::Placeholder, "promo"),
];

/// First field matched by the highest-priority selector that matches
/// anything, together with that selector.
pub fn match_coupon_field(fields: &[InputField]) -> Option<(&InputField, &'static FieldSelector)> {
    COUPON_FIELD_SELECTORS.iter().find_map(|selector| {
        fields
            .iter()
            .find(|field| selector.matches(field))
            .map(|field| (field, selector))
    })
}

/// Locate the input a coupon code should be typed into.
pub fn find_coupon_field<P: Page + ?Sized>(page: &P) -> Option<InputField> {
    let fields = page.input_fields();
    match_coupon_field(&fields).map(|(field, _)| field.clone())
}
