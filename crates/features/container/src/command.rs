use crate::error::DispatchError;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The closed set of container commands.
///
/// Tokens are the upper-case variant names and are matched case-sensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    #[default]
    View,
    Add,
    Update,
    Delete,
    Exit,
}

impl Command {
    /// Resolves the `command` parameter. Absent means [`Command::View`].
    ///
    /// # Errors
    /// Returns [`DispatchError::UnknownCommand`] for any token that is not exactly one
    /// of `VIEW`, `ADD`, `UPDATE`, `DELETE`, `EXIT`.
    pub fn resolve(token: Option<&str>) -> Result<Self, DispatchError> {
        token.map_or(Ok(Self::View), |token| {
            token.parse().map_err(|_| DispatchError::UnknownCommand {
                message: token.to_owned().into(),
                context: None,
            })
        })
    }

    /// Canonical token, e.g. `"UPDATE"`.
    #[must_use]
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// Commands offered next to a configuration: everything but `VIEW`, which is a plain GET.
    #[must_use]
    pub fn actions() -> Vec<Self> {
        Self::iter().filter(|c| *c != Self::View).collect()
    }

    /// Commands offered on the index page.
    #[must_use]
    pub fn server_commands() -> Vec<Self> {
        vec![Self::Exit]
    }
}
