//! Stage prompt templates.
//!
//! Every template asks for a single JSON object and names the shot array
//! the quality gate counts (`scene_formula`, `chapter_beats`, `storyboard`
//! or `shots`).

use crate::domain::pipeline::PipelineStage;
use crate::domain::skills::SkillDecision;

const BLUEPRINT_SYSTEM: &str = "你是严谨的故事策划编辑，只输出合法JSON。";
const DETAILED_OUTLINE_SYSTEM: &str = "你是小说细纲拆解器，只输出合法JSON。";
const WORLD_STATE_SYSTEM: &str = "你是世界状态建模器，只输出合法JSON。";
const CHARACTER_INIT_SYSTEM: &str = "你是小说人物档案编辑，只输出合法JSON。";

/// Base system prompt of a stage. `Ready` produces nothing and has none.
pub fn base_system_prompt(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::Blueprint => BLUEPRINT_SYSTEM,
        PipelineStage::DetailedOutline => DETAILED_OUTLINE_SYSTEM,
        PipelineStage::WorldState => WORLD_STATE_SYSTEM,
        PipelineStage::CharacterInit => CHARACTER_INIT_SYSTEM,
        PipelineStage::Ready => "",
    }
}

/// System prompt with the routed skill's references appended.
pub fn system_prompt(stage: PipelineStage, decision: &SkillDecision) -> String {
    let base = base_system_prompt(stage);
    let references = decision.reference_block();
    if references.trim().is_empty() {
        return base.to_string();
    }
    format!(
        "{}\n\n【写作技能：{}】\n{}",
        base, decision.skill_name, references
    )
}

/// User prompt of a stage.
pub fn stage_prompt(stage: PipelineStage, idea: &str, chapter_count: u32) -> String {
    match stage {
        PipelineStage::Blueprint => blueprint_prompt(idea, chapter_count),
        PipelineStage::DetailedOutline => detailed_outline_prompt(idea, chapter_count),
        PipelineStage::WorldState => world_state_prompt(idea),
        PipelineStage::CharacterInit => character_init_prompt(idea),
        PipelineStage::Ready => String::new(),
    }
}

fn blueprint_prompt(idea: &str, chapter_count: u32) -> String {
    format!(
        r#"请根据下面的创意生成故事蓝图。

【创意】
{idea}

【篇幅】
总章节数约 {chapter_count} 章。

只输出一个 JSON 对象，结构如下：
{{
  "title_candidate": "书名候选",
  "genre": "题材",
  "target_audience": "目标读者",
  "character_setup": [{{"name": "", "role": "", "desire": "", "flaw": ""}}],
  "core_event": "核心事件",
  "conflicts": ["主要冲突"],
  "plot_development": "剧情发展脉络",
  "scene_formula": ["地点+人物+事件+结果"]
}}

要求：scene_formula 每一项都写成“地点+人物+事件+结果”，按剧情顺序排列。"#
    )
}

fn detailed_outline_prompt(idea: &str, chapter_count: u32) -> String {
    format!(
        r#"请把故事蓝图拆解为分卷细纲。

【创意】
{idea}

【篇幅】
总章节数约 {chapter_count} 章，分卷数量自行决定。

只输出一个 JSON 对象，结构如下：
{{
  "summary": "全书梗概",
  "volumes": [
    {{
      "title": "卷名",
      "goal": "本卷目标",
      "chapter_beats": [
        {{
          "chapter": 1,
          "title": "章节标题",
          "beat": "本章推进",
          "scene_formula": ["地点+人物+事件+结果"]
        }}
      ]
    }}
  ],
  "outline_markdown": "Markdown 版细纲"
}}

要求：chapter_beats 覆盖全部章节，前后因果连贯，与蓝图的冲突设计一致。"#
    )
}

fn world_state_prompt(idea: &str) -> String {
    format!(
        r#"请根据蓝图和细纲建立开篇时的世界状态。

【创意】
{idea}

只输出一个 JSON 对象，结构如下：
{{
  "world": {{
    "environment": "时代与环境",
    "power_system": "力量体系",
    "factions": ["势力"],
    "known_methods": ["已公开的功法或技术"],
    "known_artifacts": ["已出现的法宝或道具"],
    "scene_rules": ["场景中必须遵守的规则"]
  }},
  "locations": [{{"name": "", "description": "", "controlled_by": ""}}],
  "storyboard": [
    {{"shot": 1, "location": "", "characters": [], "action": "", "result": ""}}
  ]
}}

要求：storyboard 是开篇的镜头序列，保持 3-5 个镜头，强调可执行性；设定不得与细纲矛盾。"#
    )
}

fn character_init_prompt(idea: &str) -> String {
    format!(
        r#"请根据蓝图和世界状态建立人物档案。

【创意】
{idea}

只输出一个 JSON 对象，结构如下：
{{
  "characters": [
    {{
      "name": "",
      "role": "",
      "appeared": false,
      "personality": "",
      "level": "",
      "abilities": [],
      "items": [],
      "current_goal": "",
      "action_tendency": "",
      "relationships": [{{"target": "", "relation": ""}}]
    }}
  ],
  "shots": [
    {{"character": "", "location": "", "action": "登场动作", "result": "给读者的第一印象"}}
  ]
}}

要求：主要人物各有一个登场镜头写入 shots；能力与道具必须符合世界状态中的力量体系。"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_prompt_carries_idea_and_chapter_count() {
        let prompt = stage_prompt(PipelineStage::Blueprint, "程序员穿越修仙界用代码画符", 24);
        assert!(prompt.contains("程序员穿越修仙界用代码画符"));
        assert!(prompt.contains("总章节数约 24 章"));
        assert!(prompt.contains("\"scene_formula\""));
    }

    #[test]
    fn test_each_producing_stage_names_a_shot_array() {
        for stage in PipelineStage::producing() {
            let prompt = stage_prompt(*stage, "创意", 10);
            assert!(
                crate::domain::thinking::SHOT_KEYS
                    .iter()
                    .any(|key| prompt.contains(&format!("\"{}\"", key))),
                "{} prompt names no shot array",
                stage
            );
            assert!(!base_system_prompt(*stage).is_empty());
        }
    }

    #[test]
    fn test_system_prompt_injects_references() {
        let decision = SkillDecision {
            skill_name: "outline-skill".to_string(),
            injected_references: vec!["## 目标\n先立冲突".to_string(), "节奏".to_string()],
            degraded: None,
        };
        let prompt = system_prompt(PipelineStage::Blueprint, &decision);
        assert!(prompt.starts_with(BLUEPRINT_SYSTEM));
        assert!(prompt.contains("【写作技能：outline-skill】\n## 目标\n先立冲突\n\n节奏"));
    }

    #[test]
    fn test_system_prompt_without_references_is_base() {
        let decision = SkillDecision {
            skill_name: "writing-skill".to_string(),
            injected_references: Vec::new(),
            degraded: None,
        };
        assert_eq!(
            system_prompt(PipelineStage::WorldState, &decision),
            WORLD_STATE_SYSTEM
        );
    }
}
