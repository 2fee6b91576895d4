//! Window-rule matching
//!
//! Rules are matched against a toplevel's app-id and title. Within each
//! list evaluation is short-circuit, first-match-wins; a rule with no
//! patterns matches everything, and patterns that are present are ANDed.
//! A pattern never matches an absent attribute.

use regex::Regex;
use thiserror::Error;

use crate::config::{RuleCondition, RulesConfig};
use crate::geometry::{Rect, Size};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid window-rule pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// A rule condition with its patterns compiled.
#[derive(Debug)]
pub struct Condition {
    app_id: Option<Regex>,
    title: Option<Regex>,
}

impl Condition {
    fn compile(config: &RuleCondition) -> Result<Self, RuleError> {
        let compile = |pattern: &Option<String>| -> Result<Option<Regex>, RuleError> {
            match pattern {
                Some(p) => Regex::new(p)
                    .map(Some)
                    .map_err(|source| RuleError::Pattern { pattern: p.clone(), source }),
                None => Ok(None),
            }
        };
        Ok(Self { app_id: compile(&config.app_id)?, title: compile(&config.title)? })
    }

    pub fn matches(&self, app_id: Option<&str>, title: Option<&str>) -> bool {
        let app_id_ok = match &self.app_id {
            Some(regex) => app_id.is_some_and(|value| regex.is_match(value)),
            None => true,
        };
        let title_ok = match &self.title {
            Some(regex) => title.is_some_and(|value| regex.is_match(value)),
            None => true,
        };
        app_id_ok && title_ok
    }
}

#[derive(Debug)]
struct SizeRule {
    condition: Condition,
    width: u32,
    height: u32,
    relative_width: bool,
    relative_height: bool,
}

#[derive(Debug)]
struct OpacityRule {
    condition: Condition,
    active: f32,
    inactive: f32,
}

/// All configured rules, compiled once at startup.
#[derive(Debug)]
pub struct CompiledRules {
    float: Vec<Condition>,
    size: Vec<SizeRule>,
    opacity: Vec<OpacityRule>,
}

impl CompiledRules {
    pub fn compile(config: &RulesConfig) -> Result<Self, RuleError> {
        let float = config
            .float
            .iter()
            .map(Condition::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let size = config
            .size
            .iter()
            .map(|rule| {
                Ok(SizeRule {
                    condition: Condition::compile(&rule.condition)?,
                    width: rule.width,
                    height: rule.height,
                    relative_width: rule.relative_width,
                    relative_height: rule.relative_height,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        let opacity = config
            .opacity
            .iter()
            .map(|rule| {
                Ok(OpacityRule {
                    condition: Condition::compile(&rule.condition)?,
                    active: rule.active,
                    inactive: rule.inactive,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(Self { float, size, opacity })
    }

    /// Does any float rule match?
    pub fn matches_float(&self, app_id: Option<&str>, title: Option<&str>) -> bool {
        self.float.iter().any(|condition| condition.matches(app_id, title))
    }

    /// Size from the first matching size rule. Relative dimensions are a
    /// percentage of the output's usable area.
    pub fn floating_size(
        &self,
        app_id: Option<&str>,
        title: Option<&str>,
        usable_area: Rect,
    ) -> Option<Size> {
        let rule = self.size.iter().find(|rule| rule.condition.matches(app_id, title))?;

        let width = if rule.relative_width {
            usable_area.width * rule.width / 100
        } else {
            rule.width
        };
        let height = if rule.relative_height {
            usable_area.height * rule.height / 100
        } else {
            rule.height
        };
        Some(Size::new(width, height))
    }

    /// Opacity pair from the first matching opacity rule, else the
    /// configured defaults.
    pub fn opacity(
        &self,
        app_id: Option<&str>,
        title: Option<&str>,
        defaults: (f32, f32),
    ) -> (f32, f32) {
        match self.opacity.iter().find(|rule| rule.condition.matches(app_id, title)) {
            Some(rule) => (rule.active, rule.inactive),
            None => defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OpacityRuleConfig, SizeRuleConfig};

    fn rule(app_id: Option<&str>, title: Option<&str>) -> RuleCondition {
        RuleCondition {
            app_id: app_id.map(String::from),
            title: title.map(String::from),
        }
    }

    #[test]
    fn test_wildcard_rule_matches_everything() {
        let condition = Condition::compile(&rule(None, None)).unwrap();
        assert!(condition.matches(None, None));
        assert!(condition.matches(Some("foot"), Some("fish")));
    }

    #[test]
    fn test_patterns_are_anded() {
        let both = Condition::compile(&rule(Some("^foot$"), Some("vim"))).unwrap();
        assert!(both.matches(Some("foot"), Some("vim scratch.rs")));
        assert!(!both.matches(Some("foot"), Some("fish")));
        assert!(!both.matches(Some("kitty"), Some("vim scratch.rs")));
    }

    #[test]
    fn test_pattern_never_matches_absent_attribute() {
        let by_app = Condition::compile(&rule(Some(".*"), None)).unwrap();
        assert!(!by_app.matches(None, Some("anything")));
    }

    #[test]
    fn test_first_match_wins() {
        let config = RulesConfig {
            float: Vec::new(),
            size: vec![
                SizeRuleConfig {
                    condition: rule(Some("^foot$"), None),
                    width: 800,
                    height: 600,
                    relative_width: false,
                    relative_height: false,
                },
                SizeRuleConfig {
                    condition: rule(None, None),
                    width: 100,
                    height: 100,
                    relative_width: false,
                    relative_height: false,
                },
            ],
            opacity: Vec::new(),
        };
        let rules = CompiledRules::compile(&config).unwrap();
        let usable = Rect::new(0, 0, 1920, 1080);
        assert_eq!(
            rules.floating_size(Some("foot"), None, usable),
            Some(Size::new(800, 600))
        );
        assert_eq!(
            rules.floating_size(Some("kitty"), None, usable),
            Some(Size::new(100, 100))
        );
    }

    #[test]
    fn test_relative_size_uses_usable_area() {
        let config = RulesConfig {
            float: Vec::new(),
            size: vec![SizeRuleConfig {
                condition: rule(None, None),
                width: 50,
                height: 25,
                relative_width: true,
                relative_height: true,
            }],
            opacity: Vec::new(),
        };
        let rules = CompiledRules::compile(&config).unwrap();
        let usable = Rect::new(0, 0, 1920, 1000);
        assert_eq!(rules.floating_size(None, None, usable), Some(Size::new(960, 250)));
    }

    #[test]
    fn test_opacity_falls_back_to_defaults() {
        let config = RulesConfig {
            float: Vec::new(),
            size: Vec::new(),
            opacity: vec![OpacityRuleConfig {
                condition: rule(Some("^mpv$"), None),
                active: 1.0,
                inactive: 1.0,
            }],
        };
        let rules = CompiledRules::compile(&config).unwrap();
        assert_eq!(rules.opacity(Some("mpv"), None, (0.9, 0.8)), (1.0, 1.0));
        assert_eq!(rules.opacity(Some("foot"), None, (0.9, 0.8)), (0.9, 0.8));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = RulesConfig {
            float: vec![rule(Some("("), None)],
            size: Vec::new(),
            opacity: Vec::new(),
        };
        assert!(CompiledRules::compile(&config).is_err());
    }
}
