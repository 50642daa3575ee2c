//! Static content: the companion persona, journal prompts and the resource catalog.

pub const SYSTEM_INSTRUCTION: &str = "You are Ask Doc, an AI companion designed to support mental well-being and emotional healing.
Your role is to listen with empathy, provide general information about mental health,
and guide users toward healthier habits, self-reflection, and community support.

Core Guidelines:
- Always respond with compassion, clarity, and respect.
- Never diagnose, prescribe, or replace professional medical advice.
- Encourage users to seek support from trusted people (friends, family, therapists, helplines).
- Share general strategies for emotional regulation, stress management, mindfulness, and self-care.
- Keep tone warm, non-judgmental, and empowering.
- Protect user privacy and avoid storing sensitive details unless explicitly requested.
- Focus on ethical, inclusive, and culturally sensitive communication.
- Goal: Help users feel heard, supported, and guided toward positive next steps.

IMPORTANT: You are running on a low-latency model. Keep responses concise unless asked for elaboration.";

pub const WELCOME_MESSAGE: &str =
    "Hello, I'm Ask Doc. I'm here to listen and support you. How are you feeling today?";

pub const CONNECTION_TROUBLE_MESSAGE: &str =
    "I'm having trouble connecting right now. Please check your configuration.";

pub const CHAT_FAILURE_MESSAGE: &str =
    "I'm sorry, I'm having trouble processing that right now. Could you try again?";

pub const DISCLAIMER: &str =
    "Ask Doc provides general guidance and is not a substitute for professional medical advice.";

pub const INSIGHTS_DISCLAIMER: &str = "This analysis is generated by AI based on your logs. It is for self-reflection only and not a clinical diagnosis. Always consult with a professional for mental health concerns.";

pub const JOURNAL_PROMPTS: [&str; 7] = [
    "What is one thing you are grateful for today?",
    "Describe a moment today where you felt at peace.",
    "What is a challenge you faced today, and how did you handle it?",
    "Write about a person who makes you feel supported.",
    "What is one small act of self-care you can do right now?",
    "How is your body feeling in this present moment?",
    "What would you say to a friend who is feeling exactly how you feel now?",
];

/// Pick a journal prompt at random.
pub fn random_prompt() -> &'static str {
    use rand::seq::SliceRandom;
    JOURNAL_PROMPTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(JOURNAL_PROMPTS[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    Emergency,
    Education,
    Tools,
}

impl ResourceCategory {
    pub fn all() -> [ResourceCategory; 3] {
        [
            ResourceCategory::Emergency,
            ResourceCategory::Education,
            ResourceCategory::Tools,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Emergency => "Emergency",
            ResourceCategory::Education => "Education",
            ResourceCategory::Tools => "Tools",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLink {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub category: ResourceCategory,
}

pub const RESOURCES: [ResourceLink; 8] = [
    ResourceLink {
        title: "988 Suicide & Crisis Lifeline",
        description: "24/7, free and confidential support for people in distress.",
        url: "https://988lifeline.org/",
        category: ResourceCategory::Emergency,
    },
    ResourceLink {
        title: "NAMI HelpLine",
        description: "Free, nationwide peer-support service providing information and resource referrals.",
        url: "https://www.nami.org/help",
        category: ResourceCategory::Emergency,
    },
    ResourceLink {
        title: "Crisis Text Line",
        description: "Text HOME to 741741 to connect with a Crisis Counselor. Free 24/7 support.",
        url: "https://www.crisistextline.org/",
        category: ResourceCategory::Emergency,
    },
    ResourceLink {
        title: "Mindfulness for Beginners",
        description: "A guide to getting started with mindfulness practice.",
        url: "https://www.mindful.org/meditation/mindfulness-getting-started/",
        category: ResourceCategory::Education,
    },
    ResourceLink {
        title: "Sleep Foundation",
        description: "Expert information on sleep hygiene and how to improve your rest.",
        url: "https://www.sleepfoundation.org/sleep-hygiene",
        category: ResourceCategory::Education,
    },
    ResourceLink {
        title: "Box Breathing Technique",
        description: "A simple breathing exercise to reduce stress.",
        url: "https://www.webmd.com/balance/what-is-box-breathing",
        category: ResourceCategory::Tools,
    },
    ResourceLink {
        title: "Insight Timer",
        description: "Free app for sleep, anxiety, and stress with thousands of guided meditations.",
        url: "https://insighttimer.com/",
        category: ResourceCategory::Tools,
    },
    ResourceLink {
        title: "7 Cups",
        description: "Free online text chat with a trained listener for emotional support.",
        url: "https://www.7cups.com/",
        category: ResourceCategory::Tools,
    },
];

/// Resources in display order: grouped by category, catalog order within a group.
pub fn resources_by_category() -> Vec<&'static ResourceLink> {
    ResourceCategory::all()
        .into_iter()
        .flat_map(|category| RESOURCES.iter().filter(move |r| r.category == category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_prompt_is_from_catalog() {
        for _ in 0..20 {
            assert!(JOURNAL_PROMPTS.contains(&random_prompt()));
        }
    }

    #[test]
    fn test_resources_grouped_by_category() {
        let ordered = resources_by_category();
        assert_eq!(ordered.len(), RESOURCES.len());
        assert_eq!(ordered[0].category, ResourceCategory::Emergency);
        assert_eq!(ordered.last().unwrap().category, ResourceCategory::Tools);
        assert!(ordered.iter().all(|r| r.url.starts_with("https://")));
    }
}
