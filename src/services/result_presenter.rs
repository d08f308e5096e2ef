//! 结果展示 - 业务能力层
//!
//! 把工作流返回的 `outputs.result` 解释为"分类 → 标签名 → 标签列表"的结构，
//! 解析失败时退回原始文本展示

use serde_json::{Map, Value};

/// 标签内容：数组显示为标签块，其余值显示为纯文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chips {
    Tags(Vec<String>),
    Text(String),
}

/// 分类下的一个标签组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub label: String,
    pub chips: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryContent {
    /// 二级结构：标签名 → 标签内容，可能为空
    Groups(Vec<TagGroup>),
    /// 分类直接对应标签或文本
    Chips(Chips),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub content: CategoryContent,
}

/// 结果视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    /// 没有结果
    Empty,
    /// 结构化的分类结果
    Categories(Vec<Category>),
    /// 顶层就是一组标签
    Tags(Vec<String>),
    /// 无法解析为结构化数据，原样展示
    Raw(String),
}

impl ResultView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResultView::Empty)
    }
}

/// 解释工作流结果
///
/// 解析失败不会报错，而是退回到 `ResultView::Raw`
pub fn present(result: &Value) -> ResultView {
    match result {
        Value::Null => ResultView::Empty,
        Value::String(raw) => present_text(raw),
        Value::Array(items) => present_array(items),
        Value::Object(map) => ResultView::Categories(categories(map)),
        scalar => ResultView::Raw(scalar.to_string()),
    }
}

fn present_text(raw: &str) -> ResultView {
    if raw.trim().is_empty() {
        return ResultView::Empty;
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => ResultView::Categories(categories(&map)),
        Ok(Value::Array(items)) => present_array(&items),
        Ok(Value::String(inner)) => ResultView::Raw(inner),
        Ok(Value::Null) => ResultView::Empty,
        Ok(_) | Err(_) => ResultView::Raw(raw.to_string()),
    }
}

/// 数组结果：若每个元素都能解析为对象则合并其分类，否则作为一组标签
fn present_array(items: &[Value]) -> ResultView {
    let parsed: Option<Vec<Map<String, Value>>> = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Some(map.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        })
        .collect();

    match parsed {
        Some(maps) if !maps.is_empty() => {
            ResultView::Categories(maps.iter().flat_map(categories).collect())
        }
        _ if items.is_empty() => ResultView::Empty,
        _ => ResultView::Tags(items.iter().map(scalar_text).collect()),
    }
}

fn categories(map: &Map<String, Value>) -> Vec<Category> {
    map.iter()
        .map(|(name, value)| Category {
            name: name.clone(),
            content: match value {
                Value::Object(labels) => CategoryContent::Groups(
                    labels
                        .iter()
                        .map(|(label, tags)| TagGroup {
                            label: label.clone(),
                            chips: chips(tags),
                        })
                        .collect(),
                ),
                other => CategoryContent::Chips(chips(other)),
            },
        })
        .collect()
}

fn chips(value: &Value) -> Chips {
    match value {
        Value::Array(items) => Chips::Tags(items.iter().map(scalar_text).collect()),
        other => Chips::Text(scalar_text(other)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_two_level_mapping_from_json_string() {
        let raw = r#"{"学科":{"一级":["数学","代数"],"二级":["方程"]},"难度":{}}"#;

        let view = present(&Value::String(raw.to_string()));

        assert_eq!(
            view,
            ResultView::Categories(vec![
                Category {
                    name: "学科".to_string(),
                    content: CategoryContent::Groups(vec![
                        TagGroup {
                            label: "一级".to_string(),
                            chips: Chips::Tags(vec!["数学".to_string(), "代数".to_string()]),
                        },
                        TagGroup {
                            label: "二级".to_string(),
                            chips: Chips::Tags(vec!["方程".to_string()]),
                        },
                    ]),
                },
                Category {
                    name: "难度".to_string(),
                    content: CategoryContent::Groups(vec![]),
                },
            ])
        );
    }

    #[test]
    fn test_category_scalars_and_arrays() {
        let view = present(&json!({ "summary": "ok", "keywords": ["a", 1], "meta": { "pages": 3 } }));

        let ResultView::Categories(categories) = view else {
            panic!("expected categories");
        };
        assert_eq!(categories[0].content, CategoryContent::Chips(Chips::Text("ok".to_string())));
        assert_eq!(
            categories[1].content,
            CategoryContent::Chips(Chips::Tags(vec!["a".to_string(), "1".to_string()]))
        );
        assert_eq!(
            categories[2].content,
            CategoryContent::Groups(vec![TagGroup {
                label: "pages".to_string(),
                chips: Chips::Text("3".to_string()),
            }])
        );
    }

    #[test]
    fn test_non_json_falls_back_to_raw() {
        let text = "文档主要讨论了 {不完整的 JSON";
        assert_eq!(present(&json!(text)), ResultView::Raw(text.to_string()));
    }

    #[test]
    fn test_json_scalar_string_is_raw() {
        assert_eq!(present(&json!("42")), ResultView::Raw("42".to_string()));
        assert_eq!(present(&json!("\"hello\"")), ResultView::Raw("hello".to_string()));
    }

    #[test]
    fn test_empty_results() {
        assert!(present(&Value::Null).is_empty());
        assert!(present(&json!("")).is_empty());
        assert!(present(&json!("null")).is_empty());
        assert!(present(&json!([])).is_empty());
    }

    #[test]
    fn test_array_of_json_strings_is_merged() {
        let view = present(&json!([r#"{"A":{"x":["1"]}}"#, r#"{"B":["2"]}"#]));

        let ResultView::Categories(categories) = view else {
            panic!("expected categories");
        };
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "A");
        assert_eq!(categories[1].name, "B");
    }

    #[test]
    fn test_array_of_plain_strings_is_tags() {
        assert_eq!(
            present(&json!(["报告", "合同"])),
            ResultView::Tags(vec!["报告".to_string(), "合同".to_string()])
        );
    }
}
