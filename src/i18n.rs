//! 页面文案的多语言支持

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 支持的语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    En,
    #[default]
    Zh,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// 解析 `?lang=` 参数，无法识别时使用默认语言
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("en") => Locale::En,
            _ => Locale::Zh,
        }
    }

    /// 切换器中显示的语言名
    pub fn label(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Zh => "中文",
        }
    }

    fn table(self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            Locale::En => &EN,
            Locale::Zh => &ZH,
        }
    }
}

static EN: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "chooseAtLeastOneFile" => "Please select at least one file",
    "maxFiles" => "You can upload up to {{max}} files",
    "uploadFailed" => "File upload failed",
    "noFileId" => "Failed to get file ID",
    "workflowFailed" => "Workflow execution failed",
    "error" => "An error occurred",
    "analysisResult" => "Analysis Result",
    "systemTitle" => "Document Analysis System",
    "systemSubtitle" => "Upload documents to automatically extract tags and dimensions",
    "selectFiles" => "Choose File",
    "supportFormats" => "Supports multiple document formats, up to {{max}} files",
    "selectedFiles" => "Selected {{count}} files:",
    "processing" => "Processing...",
    "uploadAnalyze" => "Upload and Analyze",
    "resultTitle" => "Document Analysis Result",
    "rawResultTitle" => "Process Result",
};

static ZH: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "chooseAtLeastOneFile" => "请选择至少一个文件",
    "maxFiles" => "一次最多上传 {{max}} 个文件",
    "uploadFailed" => "文件上传失败",
    "noFileId" => "未能获取文件ID",
    "workflowFailed" => "执行工作流失败",
    "error" => "发生错误",
    "analysisResult" => "分析结果",
    "systemTitle" => "文档分析系统",
    "systemSubtitle" => "上传文档，自动提取标签和维度",
    "selectFiles" => "选择文件",
    "supportFormats" => "支持多种文档格式，最多{{max}}个文件",
    "selectedFiles" => "已选择 {{count}} 个文件：",
    "processing" => "处理中...",
    "uploadAnalyze" => "上传并分析",
    "resultTitle" => "文档分析结果",
    "rawResultTitle" => "处理结果",
};

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").ok());

/// 查找文案，未知的 key 原样返回
pub fn t(locale: Locale, key: &str) -> String {
    t_with(locale, key, &[])
}

/// 查找文案并替换 `{{name}}` 占位符
///
/// 没有提供值的占位符保持原样
pub fn t_with(locale: Locale, key: &str, vars: &[(&str, String)]) -> String {
    let template = locale.table().get(key).copied().unwrap_or(key);

    let Some(re) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };

    re.replace_all(template, |caps: &Captures| {
        vars.iter()
            .find(|(name, _)| *name == &caps[1])
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!(Locale::parse(Some("en")), Locale::En);
        assert_eq!(Locale::parse(Some(" EN ")), Locale::En);
        assert_eq!(Locale::parse(Some("fr")), Locale::Zh);
        assert_eq!(Locale::parse(None), Locale::Zh);
    }

    #[test]
    fn test_interpolation() {
        assert_eq!(
            t_with(Locale::Zh, "selectedFiles", &[("count", "3".to_string())]),
            "已选择 3 个文件："
        );
        assert_eq!(
            t_with(Locale::En, "maxFiles", &[("max", "10".to_string())]),
            "You can upload up to 10 files"
        );
    }

    #[test]
    fn test_missing_var_is_left_in_place() {
        assert_eq!(t(Locale::En, "selectedFiles"), "Selected {{count}} files:");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(t(Locale::Zh, "notARealKey"), "notARealKey");
    }

    #[test]
    fn test_tables_have_same_keys() {
        for key in EN.keys() {
            assert!(ZH.contains_key(*key), "zh 缺少 {}", key);
        }
        assert_eq!(EN.len(), ZH.len());
    }
}
