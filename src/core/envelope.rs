//! 统一回复信封：`{content: [{type: "text", text}], isError}`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// 每次分发恰好返回一个信封，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl ResultEnvelope {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(message)],
            is_error: true,
        }
    }

    /// 第一条文本（信封总是恰好一条）
    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let env = ResultEnvelope::text("# Test Content");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{"type": "text", "text": "# Test Content"}],
                "isError": false
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let env = ResultEnvelope::error("API Error");
        assert!(env.is_error);
        assert_eq!(env.first_text(), "API Error");
        assert_eq!(env.content.len(), 1);
    }
}
