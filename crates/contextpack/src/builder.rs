use st_domain::catalog::{Domain, Site};
use st_domain::model::{ChatTurn, Conversation, Role};

use crate::prompt;
use crate::report::ContextReport;

/// Everything a single assembly looks at.  All parts are optional except
/// the incoming message.
#[derive(Debug, Clone, Copy)]
pub struct ContextInput<'a> {
    pub conversation: Option<&'a Conversation>,
    pub domain: Option<&'a Domain>,
    pub site: Option<&'a Site>,
    pub message: &'a str,
    /// Global settings prompt; wins over the domain prompt when non-empty.
    pub override_prompt: Option<&'a str>,
}

/// Deterministic context builder.
///
/// Pure function of its inputs: exactly one system turn first, then the
/// prior turns oldest first, then the incoming user turn last.
pub struct ContextAssembler {
    fallback_prompt: String,
}

impl ContextAssembler {
    pub fn new(fallback_prompt: impl Into<String>) -> Self {
        Self {
            fallback_prompt: fallback_prompt.into(),
        }
    }

    pub fn assemble(&self, input: ContextInput<'_>) -> (Vec<ChatTurn>, ContextReport) {
        let (base, prompt_source) =
            prompt::effective_prompt(input.override_prompt, input.domain, &self.fallback_prompt);
        let mut system = base.to_owned();
        let site_scoped = prompt::scope_to_site(&mut system, input.site);

        let prior = input.conversation.map(|c| c.messages.as_slice()).unwrap_or(&[]);

        let mut turns = Vec::with_capacity(prior.len() + 2);
        let system_prompt_chars = system.chars().count();
        turns.push(ChatTurn::new(Role::System, system));
        turns.extend(prior.iter().map(ChatTurn::from));
        turns.push(ChatTurn::new(Role::User, input.message));

        let report = ContextReport {
            prompt_source,
            system_prompt_chars,
            prior_messages: prior.len(),
            site_scoped,
            total_turns: turns.len(),
        };

        (turns, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_domain::model::Message;

    fn conversation(n: usize) -> Conversation {
        let messages = (0..n)
            .map(|i| Message {
                id: format!("m{i}"),
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("prior {i}"),
                timestamp: i as i64,
            })
            .collect();
        Conversation {
            id: "c".into(),
            title: "t".into(),
            messages,
            endpoint_id: "e".into(),
            domain_id: None,
            site_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn kumba() -> Site {
        Site {
            id: "kumba".into(),
            name: "Kumba Iron Ore".into(),
            location: "South Africa".into(),
            kind: "Iron Ore".into(),
        }
    }

    #[test]
    fn system_first_prior_in_order_user_last() {
        let conv = conversation(3);
        let assembler = ContextAssembler::new("fallback");
        let (turns, report) = assembler.assemble(ContextInput {
            conversation: Some(&conv),
            domain: None,
            site: None,
            message: "new question",
            override_prompt: None,
        });

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].content, "fallback");
        assert_eq!(turns[1].content, "prior 0");
        assert_eq!(turns[2].content, "prior 1");
        assert_eq!(turns[3].content, "prior 2");
        assert_eq!(turns[4].role, Role::User);
        assert_eq!(turns[4].content, "new question");
        assert_eq!(turns.iter().filter(|t| t.role == Role::System).count(), 1);
        assert_eq!(report.prior_messages, 3);
        assert_eq!(report.total_turns, 5);
    }

    #[test]
    fn no_conversation_gives_two_turns() {
        let assembler = ContextAssembler::new("fallback");
        let (turns, _) = assembler.assemble(ContextInput {
            conversation: None,
            domain: None,
            site: None,
            message: "hi",
            override_prompt: None,
        });
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn site_clause_appended_after_space() {
        let site = kumba();
        let assembler = ContextAssembler::new("Base prompt.");
        let (turns, report) = assembler.assemble(ContextInput {
            conversation: None,
            domain: None,
            site: Some(&site),
            message: "hi",
            override_prompt: None,
        });
        assert_eq!(
            turns[0].content,
            "Base prompt. Focus on data and context specific to Kumba Iron Ore (South Africa)."
        );
        assert!(report.site_scoped);
    }

    #[test]
    fn report_serializes_source_as_snake_case() {
        let assembler = ContextAssembler::new("x");
        let (_, report) = assembler.assemble(ContextInput {
            conversation: None,
            domain: None,
            site: None,
            message: "hi",
            override_prompt: Some("Override."),
        });
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["prompt_source"], "override");
    }
}
