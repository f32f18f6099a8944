//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. Output from LLMs and users
//! should be considered untrusted.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Debug)]
pub enum Prompt {
    SearchGate,
    SearchAugmented,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const SEARCH_GATE_PROMPT: &str = r#"
你是一個回答問題的專家。
請判斷以下的使用者問題是否需要網路搜尋來提供準確或最新的資訊。
如果需要，請在 `keyword` 中提供一個相關的搜尋關鍵字。
如果不需要，請將 `search` 設定為 'N'，並將 `keyword` 留空。

範例:
使用者問題: 台北101多高?
JSON 回覆: {"search": "N", "keyword": ""}

使用者問題: 今天的台北天氣如何?
JSON 回覆: {"search": "Y", "keyword": "台北天氣"}

使用者問題: 2024奧運在哪舉辦?
JSON 回覆: {"search": "Y", "keyword": "2024 奧運舉辦地點"}

使用者問題: 最近有什麼電影好看?
JSON 回覆: {"search": "Y", "keyword": "最新電影推薦"}

現在，請根據以下的使用者問題提供 JSON 回覆:
使用者問題: {{msg}}
JSON 回覆:
"#;

const SEARCH_AUGMENTED_PROMPT: &str = "使用者問題: {{question}}
以下是網路搜尋結果，請根據這些資訊來回答問題：
{{search_results}}
請綜合這些資訊並簡潔地回答使用者問題。";

#[derive(Serialize)]
pub struct SearchGateContext<'a> {
    pub msg: &'a str,
}

#[derive(Serialize)]
pub struct SearchAugmentedContext<'a> {
    pub question: &'a str,
    pub search_results: &'a str,
}

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text, HTML escaping would mangle quotes and
    // ampersands in user messages
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(&Prompt::SearchGate.to_string(), SEARCH_GATE_PROMPT)
        .expect("Failed to register template");
    registry
        .register_template_string(&Prompt::SearchAugmented.to_string(), SEARCH_AUGMENTED_PROMPT)
        .expect("Failed to register template");
    registry
}

pub fn render<T: Serialize>(registry: &Handlebars, prompt: Prompt, data: &T) -> Result<String> {
    Ok(registry.render(&prompt.to_string(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_gate_prompt_embeds_message() {
        let registry = templates();
        let out = render(
            &registry,
            Prompt::SearchGate,
            &SearchGateContext {
                msg: "今天的台北天氣如何?",
            },
        )
        .unwrap();
        assert!(out.contains("使用者問題: 今天的台北天氣如何?\nJSON 回覆:"));
        assert!(out.contains(r#"{"search": "Y", "keyword": "台北天氣"}"#));
    }

    #[test]
    fn test_prompt_does_not_html_escape() {
        let registry = templates();
        let out = render(
            &registry,
            Prompt::SearchGate,
            &SearchGateContext {
                msg: r#"Tom & "Jerry" <3"#,
            },
        )
        .unwrap();
        assert!(out.contains(r#"Tom & "Jerry" <3"#));
    }

    #[test]
    fn test_search_augmented_prompt() {
        let registry = templates();
        let out = render(
            &registry,
            Prompt::SearchAugmented,
            &SearchAugmentedContext {
                question: "今天的台北天氣如何?",
                search_results: "Snippet 1: 晴天\n",
            },
        )
        .unwrap();
        assert!(out.starts_with("使用者問題: 今天的台北天氣如何?\n"));
        assert!(out.contains("Snippet 1: 晴天"));
        assert!(out.ends_with("請綜合這些資訊並簡潔地回答使用者問題。"));
    }
}
