//! The smart router: a pure function mapping memory attributes to a tier (spec §4.5).

use std::collections::BTreeSet;

use crate::types::{MemoryType, Tier};

/// Routing inputs. `content` is taken by reference because the router never needs
/// to own it; only the `code` heuristic (`session_hint`) inspects it indirectly via
/// the caller-supplied flag rather than scanning the text itself.
#[derive(Debug, Clone)]
pub struct RouteRequest<'a> {
    pub content: &'a str,
    pub memory_type: MemoryType,
    pub tags: &'a BTreeSet<String>,
    pub ttl: Option<u64>,
    pub forced_tier: Option<Tier>,
    /// Set when the caller has an active session context hint for a generic `code`
    /// memory (spec §4.5 rule 7).
    pub session_hint: bool,
}

/// The router's decision: a tier, the rule that produced it, and a confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecision {
    pub tier: Tier,
    pub reason: &'static str,
    pub confidence: f32,
}

/// Decide which tier a memory belongs in. First matching rule wins (spec §4.5).
#[must_use]
pub fn route(req: &RouteRequest<'_>) -> RouteDecision {
    if let Some(tier) = req.forced_tier {
        return RouteDecision {
            tier,
            reason: "explicitly specified",
            confidence: 1.0,
        };
    }

    if has_tag(req.tags, &["temp", "temporary", "draft"]) {
        return RouteDecision {
            tier: Tier::L1,
            reason: "tag indicates ephemeral content",
            confidence: 0.95,
        };
    }

    if has_tag(req.tags, &["global", "universal"]) {
        return RouteDecision {
            tier: Tier::L3,
            reason: "tag indicates cross-project content",
            confidence: 0.95,
        };
    }

    if has_tag(req.tags, &["project", "local"]) {
        return RouteDecision {
            tier: Tier::L2,
            reason: "tag indicates project-scoped content",
            confidence: 0.95,
        };
    }

    if matches!(req.ttl, Some(ttl) if ttl > 0) {
        return RouteDecision {
            tier: Tier::L1,
            reason: "positive TTL implies working memory",
            confidence: 0.9,
        };
    }

    match req.memory_type {
        MemoryType::Scratchpad | MemoryType::Message | MemoryType::Thought | MemoryType::Observation => {
            RouteDecision {
                tier: Tier::L1,
                reason: "type defaults to working memory",
                confidence: 0.85,
            }
        }
        MemoryType::Decision
        | MemoryType::BugFix
        | MemoryType::Documentation
        | MemoryType::Error
        | MemoryType::Summary => RouteDecision {
            tier: Tier::L2,
            reason: "type defaults to project memory",
            confidence: 0.85,
        },
        MemoryType::CodePattern | MemoryType::Convention | MemoryType::Relationship => {
            RouteDecision {
                tier: Tier::L3,
                reason: "type defaults to semantic memory",
                confidence: 0.85,
            }
        }
        MemoryType::Code => {
            if req.session_hint {
                RouteDecision {
                    tier: Tier::L1,
                    reason: "generic code with active session context",
                    confidence: 0.8,
                }
            } else {
                RouteDecision {
                    tier: Tier::L2,
                    reason: "generic code with no session context",
                    confidence: 0.6,
                }
            }
        }
    }
}

fn has_tag(tags: &BTreeSet<String>, candidates: &[&str]) -> bool {
    tags.iter()
        .any(|tag| candidates.iter().any(|c| tag.eq_ignore_ascii_case(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req<'a>(ty: MemoryType, tags: &'a BTreeSet<String>) -> RouteRequest<'a> {
        RouteRequest {
            content: "",
            memory_type: ty,
            tags,
            ttl: None,
            forced_tier: None,
            session_hint: false,
        }
    }

    #[test]
    fn forced_tier_wins_with_full_confidence() {
        let tags = BTreeSet::new();
        let mut r = req(MemoryType::Scratchpad, &tags);
        r.forced_tier = Some(Tier::L3);
        let decision = route(&r);
        assert_eq!(decision.tier, Tier::L3);
        assert_eq!(decision.confidence, 1.0);
    }

    #[test]
    fn temp_tag_beats_type_default() {
        let tags: BTreeSet<String> = ["Temporary".to_string()].into();
        let decision = route(&req(MemoryType::Decision, &tags));
        assert_eq!(decision.tier, Tier::L1);
    }

    #[test]
    fn global_tag_beats_type_default() {
        let tags: BTreeSet<String> = ["global".to_string()].into();
        let decision = route(&req(MemoryType::Decision, &tags));
        assert_eq!(decision.tier, Tier::L3);
    }

    #[test]
    fn positive_ttl_forces_l1() {
        let tags = BTreeSet::new();
        let mut r = req(MemoryType::Decision, &tags);
        r.ttl = Some(60);
        assert_eq!(route(&r).tier, Tier::L1);
    }

    #[test]
    fn scratchpad_defaults_to_l1() {
        let tags = BTreeSet::new();
        assert_eq!(route(&req(MemoryType::Scratchpad, &tags)).tier, Tier::L1);
    }

    #[test]
    fn code_without_session_hint_falls_back_to_l2_with_lower_confidence() {
        let tags = BTreeSet::new();
        let decision = route(&req(MemoryType::Code, &tags));
        assert_eq!(decision.tier, Tier::L2);
        assert!(decision.confidence <= 0.7);
    }

    #[test]
    fn code_with_session_hint_routes_to_l1() {
        let tags = BTreeSet::new();
        let mut r = req(MemoryType::Code, &tags);
        r.session_hint = true;
        assert_eq!(route(&r).tier, Tier::L1);
    }
}
