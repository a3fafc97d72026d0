//! Declarative custom rules
//!
//! Rules defined as data rather than code: a closed [`Condition`] language,
//! a [`CustomRuleStore`] with pack import/export, and prebuilt compliance
//! packs.

pub mod condition;
pub mod packs;
pub mod store;

pub use condition::{Condition, OneOrMany, RuleCondition};
pub use packs::{prebuilt, PrebuiltPack, PACK_NAMES};
pub use store::{CustomRule, CustomRuleStore, ImportMode, ImportReport, RulePack, FORMAT_VERSION};
