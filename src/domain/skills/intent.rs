//! Orchestration intents and the skill kinds they map to.

use serde::{Deserialize, Serialize};

/// What the caller is asking the pipeline to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "intent", content = "text", rename_all = "snake_case")]
pub enum SkillIntent {
    OutlineFromIdea,
    OutlineContinue,
    OutlineExpand,
    OutlineRefineVolume,
    Rewrite,
    Polish,
    StyleRewrite,
    /// Free-form request routed by keywords.
    Consult(String),
}

/// Family of skill an intent resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Outline,
    Continuation,
    Rewrite,
    /// The general-purpose fallback.
    Writing,
}

const CONTINUATION_KEYWORDS: &[&str] = &["续写", "接着写", "下一章", "后续", "continue"];
const REWRITE_KEYWORDS: &[&str] = &[
    "润色", "改写", "重写", "风格", "压缩", "扩写", "polish", "rewrite",
];
const OUTLINE_KEYWORDS: &[&str] = &["大纲", "主线", "分卷", "设定", "结构", "outline"];

impl SkillKind {
    /// Maps an intent to a skill kind.
    ///
    /// Outline intents become continuation work once prior chapters exist.
    pub fn for_intent(intent: &SkillIntent, has_prior_chapters: bool) -> SkillKind {
        let outline = if has_prior_chapters {
            SkillKind::Continuation
        } else {
            SkillKind::Outline
        };
        match intent {
            SkillIntent::OutlineFromIdea
            | SkillIntent::OutlineContinue
            | SkillIntent::OutlineExpand
            | SkillIntent::OutlineRefineVolume => outline,
            SkillIntent::Rewrite | SkillIntent::Polish | SkillIntent::StyleRewrite => {
                SkillKind::Rewrite
            }
            SkillIntent::Consult(text) => Self::from_keywords(text),
        }
    }

    fn from_keywords(text: &str) -> SkillKind {
        let lowered = text.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));
        if hit(CONTINUATION_KEYWORDS) {
            SkillKind::Continuation
        } else if hit(REWRITE_KEYWORDS) {
            SkillKind::Rewrite
        } else if hit(OUTLINE_KEYWORDS) {
            SkillKind::Outline
        } else {
            SkillKind::Writing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_intents_route_to_outline_without_chapters() {
        for intent in [
            SkillIntent::OutlineFromIdea,
            SkillIntent::OutlineContinue,
            SkillIntent::OutlineExpand,
            SkillIntent::OutlineRefineVolume,
        ] {
            assert_eq!(SkillKind::for_intent(&intent, false), SkillKind::Outline);
            assert_eq!(SkillKind::for_intent(&intent, true), SkillKind::Continuation);
        }
    }

    #[test]
    fn rewrite_intents_ignore_prior_chapters() {
        for intent in [SkillIntent::Rewrite, SkillIntent::Polish, SkillIntent::StyleRewrite] {
            assert_eq!(SkillKind::for_intent(&intent, false), SkillKind::Rewrite);
            assert_eq!(SkillKind::for_intent(&intent, true), SkillKind::Rewrite);
        }
    }

    #[test]
    fn consult_routes_by_keyword() {
        let route = |text: &str| SkillKind::for_intent(&SkillIntent::Consult(text.into()), false);
        assert_eq!(route("帮我续写下一章"), SkillKind::Continuation);
        assert_eq!(route("把这段润色一下"), SkillKind::Rewrite);
        assert_eq!(route("设计一个分卷主线"), SkillKind::Outline);
        assert_eq!(route("Please POLISH this"), SkillKind::Rewrite);
    }

    #[test]
    fn consult_without_keywords_falls_back() {
        let intent = SkillIntent::Consult("你好".to_string());
        assert_eq!(SkillKind::for_intent(&intent, true), SkillKind::Writing);
    }
}
