//! Prompt Builder System
//!
//! Section-based prompt construction. The documentation prompt is fixed: a
//! numbered list of what to cover, then the file path and its full content.

/// System instruction sent with every documentation request
pub const DOCUMENTATION_SYSTEM: &str = "You are a technical documentation expert.";

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Introductory line followed by numbered items
    Objectives { intro: String, items: Vec<String> },
    /// `Label: value` on one line
    Field { label: String, value: String },
    /// `Label:` followed by a verbatim block
    Block { label: String, content: String },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objectives(mut self, intro: &str, items: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives {
            intro: intro.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn field(mut self, label: &str, value: &str) -> Self {
        self.sections.push(PromptSection::Field {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn block(mut self, label: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Block {
            label: label.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Objectives { intro, items } => {
                    prompt.push_str(&intro);
                    prompt.push('\n');
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Field { label, value } => {
                    prompt.push_str(&format!("{}: {}\n", label, value));
                }
                PromptSection::Block { label, content } => {
                    prompt.push_str(&format!("{}:\n", label));
                    prompt.push_str(&content);
                    prompt.push('\n');
                }
            }
        }

        prompt
    }
}

/// The per-file documentation prompt
pub fn documentation_prompt(file_path: &str, content: &str) -> String {
    PromptBuilder::new()
        .objectives(
            "Please analyze this code and provide comprehensive documentation including:",
            &[
                "Overview of the file's purpose",
                "Main components and their functionality",
                "Usage examples (if applicable)",
                "Any important notes or considerations",
            ],
        )
        .field("File", file_path)
        .block("Content", content)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_prompt_layout() {
        let prompt = documentation_prompt("src/app.py", "print('hi')");

        assert!(prompt.starts_with("Please analyze this code"));
        assert!(prompt.contains("1. Overview of the file's purpose"));
        assert!(prompt.contains("4. Any important notes or considerations"));
        assert!(prompt.contains("File: src/app.py\n"));
        assert!(prompt.ends_with("Content:\nprint('hi')\n"));
    }

    #[test]
    fn test_content_embedded_verbatim() {
        let content = "def f():\n    return 1\n\n\n# trailing";
        let prompt = documentation_prompt("f.py", content);
        assert!(prompt.contains(content));
    }

    #[test]
    fn test_builder_numbering() {
        let prompt = PromptBuilder::new()
            .objectives("Do:", &["one", "two"])
            .build();
        assert_eq!(prompt, "Do:\n1. one\n2. two\n\n");
    }
}
