//! Question Bank: the per-interview pool of prepared questions.
//!
//! Four fixed categories, each instantiated from templates and shuffled once.
//! Items are popped FIFO after the shuffle, so a question text can be issued at
//! most once per interview. HR custom questions ride along in their own
//! category-less queue.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::interview::context::InterviewContext;
use crate::interview::prompts::{render_template, TemplateError};
use crate::models::interview::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionCategory {
    #[serde(rename = "Technical Skills")]
    TechnicalSkills,
    #[serde(rename = "Behavioral")]
    Behavioral,
    #[serde(rename = "Scenario-Based")]
    ScenarioBased,
    #[serde(rename = "Company/Position")]
    CompanyPosition,
    /// Not a bank category: tags questions synthesized after the bank runs dry.
    #[serde(rename = "Generated")]
    Generated,
}

impl QuestionCategory {
    /// Bank categories in their stable preference order.
    pub const BANK: [QuestionCategory; 4] = [
        QuestionCategory::TechnicalSkills,
        QuestionCategory::Behavioral,
        QuestionCategory::ScenarioBased,
        QuestionCategory::CompanyPosition,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuestionCategory::TechnicalSkills => "Technical Skills",
            QuestionCategory::Behavioral => "Behavioral",
            QuestionCategory::ScenarioBased => "Scenario-Based",
            QuestionCategory::CompanyPosition => "Company/Position",
            QuestionCategory::Generated => "Generated",
        }
    }

    /// Intended share of the interview. Documentation only: selection prefers
    /// untouched categories, not weight.
    pub fn weight(&self) -> f32 {
        match self {
            QuestionCategory::TechnicalSkills => 0.4,
            QuestionCategory::Behavioral => 0.3,
            QuestionCategory::ScenarioBased => 0.2,
            QuestionCategory::CompanyPosition => 0.1,
            QuestionCategory::Generated => 0.0,
        }
    }
}

/// One question per (skill × template). Replace: {skill}
const TECHNICAL_TEMPLATES: [&str; 3] = [
    "Can you explain your experience with {skill}?",
    "How would you approach a problem using {skill}?",
    "What challenges have you faced with {skill} and how did you overcome them?",
];

const BEHAVIORAL_QUESTIONS: [&str; 3] = [
    "Tell me about a time you faced a difficult challenge at work and how you handled it.",
    "Describe a situation where you had to work with a difficult team member.",
    "Give an example of how you've handled a tight deadline.",
];

/// Replace: {job_role}
const SCENARIO_TEMPLATES: [&str; 3] = [
    "If you encountered an unfamiliar {job_role} scenario under time pressure, how would you handle it?",
    "How would you approach a {job_role} problem you had never seen before?",
    "What would you do if a critical {job_role} situation occurred just before a release?",
];

const COMPANY_QUESTIONS: [&str; 3] = [
    "What interests you about this position at our company?",
    "How do you see yourself contributing to our team?",
    "What do you know about our company's work in this field?",
];

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pools: HashMap<QuestionCategory, VecDeque<String>>,
    custom: VecDeque<String>,
    /// Kept for future weighting; template selection ignores it today.
    difficulty: Difficulty,
}

impl QuestionBank {
    /// A bank with nothing left in it. Every request goes straight to the
    /// custom queue (empty) and then generation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Non-empty bank categories, in `QuestionCategory::BANK` order.
    pub fn available_categories(&self) -> Vec<QuestionCategory> {
        QuestionCategory::BANK
            .into_iter()
            .filter(|c| self.remaining(*c) > 0)
            .collect()
    }

    pub fn remaining(&self, category: QuestionCategory) -> usize {
        self.pools.get(&category).map(VecDeque::len).unwrap_or(0)
    }

    pub fn custom_remaining(&self) -> usize {
        self.custom.len()
    }

    pub fn total_remaining(&self) -> usize {
        self.pools.values().map(VecDeque::len).sum::<usize>() + self.custom.len()
    }

    pub fn pop(&mut self, category: QuestionCategory) -> Option<String> {
        self.pools.get_mut(&category).and_then(VecDeque::pop_front)
    }

    pub fn pop_custom(&mut self) -> Option<String> {
        self.custom.pop_front()
    }
}

/// Builds the bank for one interview: instantiate every template, shuffle each
/// category independently, then queue the custom questions that are not
/// already in the bank.
pub fn build_question_bank<R: Rng + ?Sized>(
    context: &InterviewContext,
    rng: &mut R,
) -> Result<QuestionBank, TemplateError> {
    let mut pools: HashMap<QuestionCategory, VecDeque<String>> = HashMap::new();

    let mut technical = Vec::new();
    for skill in normalize_skills(&context.skills) {
        for template in TECHNICAL_TEMPLATES {
            technical.push(render_template(template, &[("skill", skill.as_str())])?);
        }
    }

    let behavioral: Vec<String> = BEHAVIORAL_QUESTIONS.iter().map(|q| q.to_string()).collect();

    let mut scenario = Vec::new();
    for template in SCENARIO_TEMPLATES {
        scenario.push(render_template(
            template,
            &[("job_role", context.job_role.trim())],
        )?);
    }

    let company: Vec<String> = COMPANY_QUESTIONS.iter().map(|q| q.to_string()).collect();

    for (category, mut questions) in [
        (QuestionCategory::TechnicalSkills, technical),
        (QuestionCategory::Behavioral, behavioral),
        (QuestionCategory::ScenarioBased, scenario),
        (QuestionCategory::CompanyPosition, company),
    ] {
        questions.shuffle(rng);
        pools.insert(category, questions.into());
    }

    let mut seen: HashSet<String> = pools
        .values()
        .flatten()
        .map(|q| q.to_lowercase())
        .collect();
    let custom = context
        .custom_questions
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .filter(|q| seen.insert(q.to_lowercase()))
        .map(str::to_string)
        .collect();

    Ok(QuestionBank {
        pools,
        custom,
        difficulty: context.difficulty,
    })
}

/// Trimmed, non-empty skills with case-insensitive duplicates removed, first
/// spelling wins.
fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context(skills: &[&str], custom: &[&str]) -> InterviewContext {
        InterviewContext {
            job_role: "Backend Engineer".to_string(),
            job_description: "Build and operate APIs.".to_string(),
            difficulty: Difficulty::Medium,
            custom_questions: custom.iter().map(|s| s.to_string()).collect(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn drain(bank: &mut QuestionBank, category: QuestionCategory) -> Vec<String> {
        std::iter::from_fn(|| bank.pop(category)).collect()
    }

    #[test]
    fn test_three_technical_questions_per_skill() {
        let mut rng = StdRng::seed_from_u64(7);
        let bank = build_question_bank(&context(&["python", "sql"], &[]), &mut rng).unwrap();

        assert_eq!(bank.remaining(QuestionCategory::TechnicalSkills), 6);
        assert_eq!(bank.remaining(QuestionCategory::Behavioral), 3);
        assert_eq!(bank.remaining(QuestionCategory::ScenarioBased), 3);
        assert_eq!(bank.remaining(QuestionCategory::CompanyPosition), 3);
        assert_eq!(bank.total_remaining(), 15);
    }

    #[test]
    fn test_scenario_questions_name_the_role() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bank = build_question_bank(&context(&[], &[]), &mut rng).unwrap();
        let scenario = drain(&mut bank, QuestionCategory::ScenarioBased);

        assert_eq!(scenario.len(), 3);
        for question in scenario {
            assert!(question.contains("Backend Engineer"), "{question}");
            assert!(!question.contains('{'), "unrendered placeholder in {question}");
        }
    }

    #[test]
    fn test_duplicate_skills_collapse() {
        let mut rng = StdRng::seed_from_u64(3);
        let bank =
            build_question_bank(&context(&["SQL", "sql", "  ", " sql "], &[]), &mut rng).unwrap();
        assert_eq!(bank.remaining(QuestionCategory::TechnicalSkills), 3);
    }

    #[test]
    fn test_no_skills_leaves_technical_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let bank = build_question_bank(&context(&[], &[]), &mut rng).unwrap();
        assert_eq!(
            bank.available_categories(),
            vec![
                QuestionCategory::Behavioral,
                QuestionCategory::ScenarioBased,
                QuestionCategory::CompanyPosition
            ]
        );
    }

    #[test]
    fn test_shuffle_keeps_every_question_exactly_once() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut bank = build_question_bank(&context(&["rust"], &[]), &mut rng).unwrap();
        let mut technical = drain(&mut bank, QuestionCategory::TechnicalSkills);
        technical.sort();

        let mut expected: Vec<String> = TECHNICAL_TEMPLATES
            .iter()
            .map(|t| t.replace("{skill}", "rust"))
            .collect();
        expected.sort();
        assert_eq!(technical, expected);
    }

    #[test]
    fn test_same_seed_same_order() {
        let ctx = context(&["python", "sql", "docker"], &[]);
        let mut a = build_question_bank(&ctx, &mut StdRng::seed_from_u64(5)).unwrap();
        let mut b = build_question_bank(&ctx, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(
            drain(&mut a, QuestionCategory::TechnicalSkills),
            drain(&mut b, QuestionCategory::TechnicalSkills)
        );
    }

    #[test]
    fn test_custom_questions_queued_once_without_blanks_or_bank_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut bank = build_question_bank(
            &context(
                &[],
                &[
                    "Why do you want to leave your current role?",
                    "   ",
                    "how do you see yourself contributing to our team?",
                    "Why do you want to leave your current role?",
                ],
            ),
            &mut rng,
        )
        .unwrap();

        assert_eq!(bank.custom_remaining(), 1);
        assert_eq!(
            bank.pop_custom().as_deref(),
            Some("Why do you want to leave your current role?")
        );
        assert!(bank.pop_custom().is_none());
    }

    #[test]
    fn test_empty_bank_has_nothing_available() {
        let bank = QuestionBank::empty();
        assert!(bank.available_categories().is_empty());
        assert_eq!(bank.total_remaining(), 0);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = QuestionCategory::BANK.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_category_serializes_with_display_name() {
        let json = serde_json::to_string(&QuestionCategory::CompanyPosition).unwrap();
        assert_eq!(json, r#""Company/Position""#);
    }
}
