//! Built-in catalogs: writing tools, voices, and template rendering.

use std::collections::HashMap;

use crate::types::ToolKind;

/// Whether a tool produces text or audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Writing,
    Audio,
}

/// Descriptor for one built-in writing tool.
#[derive(Debug, Clone)]
pub struct WritingTool {
    pub tool: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
}

/// The shipped tool set, in display order.
pub fn writing_tools() -> Vec<WritingTool> {
    vec![
        WritingTool {
            tool: ToolKind::Rewrite,
            name: "Smart Rewrite",
            description: "Improve existing text with different tones and styles",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Article,
            name: "Article Generation",
            description: "Create complete, SEO-optimized articles",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Email,
            name: "Professional Emails",
            description: "Templates and quick replies for business email",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Social,
            name: "Social Media Posts",
            description: "Content optimized for multiple platforms",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Product,
            name: "Product Descriptions",
            description: "Persuasive copy that converts visitors into customers",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Correction,
            name: "Proofreading & Style",
            description: "Advanced grammar checking with suggestions",
            category: ToolCategory::Writing,
        },
        WritingTool {
            tool: ToolKind::Tts,
            name: "Text-to-Speech",
            description: "Convert any text into professional audio",
            category: ToolCategory::Audio,
        },
        WritingTool {
            tool: ToolKind::Audiobook,
            name: "Automatic Audiobooks",
            description: "Turn long articles into audiobooks",
            category: ToolCategory::Audio,
        },
    ]
}

/// Voice quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceTier {
    Standard,
    Premium,
}

/// Descriptor for one built-in voice.
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub language: &'static str,
    pub tier: VoiceTier,
}

/// The shipped voice set.
pub fn voices() -> Vec<VoiceProfile> {
    vec![
        VoiceProfile {
            id: "en-us-ana",
            name: "Ana",
            language: "English (US)",
            tier: VoiceTier::Standard,
        },
        VoiceProfile {
            id: "en-us-carlos",
            name: "Carlos",
            language: "English (US)",
            tier: VoiceTier::Standard,
        },
        VoiceProfile {
            id: "en-us-sarah",
            name: "Sarah",
            language: "English (US)",
            tier: VoiceTier::Premium,
        },
        VoiceProfile {
            id: "en-us-david",
            name: "David",
            language: "English (US)",
            tier: VoiceTier::Premium,
        },
        VoiceProfile {
            id: "es-es-maria",
            name: "María",
            language: "Español",
            tier: VoiceTier::Standard,
        },
        VoiceProfile {
            id: "fr-fr-pierre",
            name: "Pierre",
            language: "Français",
            tier: VoiceTier::Standard,
        },
    ]
}

/// Look up a built-in voice by id.
pub fn find_voice(id: &str) -> Option<VoiceProfile> {
    voices().into_iter().find(|voice| voice.id == id)
}

/// Substitute `{variable}` placeholders in a template body.
///
/// Placeholders without a matching variable are left intact so the user can
/// see what is still missing.
pub fn render_template(content: &str, variables: &HashMap<String, String>) -> String {
    let mut rendered = content.to_string();
    for (name, value) in variables {
        rendered = rendered.replace(&format!("{{{}}}", name), value);
    }
    rendered
}
