pub mod currency;
pub mod format;
pub mod i18n;
pub mod share;

pub use self::{
    format::{escape_html, excerpt, minutes_for_words, reading_time},
    i18n::Translations,
    share::ShareLinks,
};
