use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppResult;
use crate::models::form::{DocumentFile, DocumentSlot, FloodStatus, FormField};

/// 一份待提交的 intake 文件（TOML）
///
/// 证件路径为相对路径时，相对于 TOML 文件所在目录解析
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeFile {
    #[serde(default, deserialize_with = "deserialize_mileage")]
    pub current_mileage: String,
    #[serde(default)]
    pub accident_desc: String,
    pub is_flooded: Option<bool>,
    #[serde(default)]
    pub issue_details: String,
    pub registration_gap: Option<String>,
    pub registration_eul: Option<String>,
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl IntakeFile {
    /// 日志中显示的名称
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "<inline>".to_string())
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let path = PathBuf::from(relative);
        if path.is_absolute() {
            return path;
        }
        match self.file_path.as_deref().and_then(|p| Path::new(p).parent()) {
            Some(dir) => dir.join(path),
            None => path,
        }
    }

    /// 转换为按表单顺序填写的字段
    ///
    /// # 返回
    /// 读取证件失败或类型不支持时返回错误
    pub async fn form_fields(&self) -> AppResult<Vec<FormField>> {
        let mut fields = Vec::new();

        for (slot, path) in [
            (DocumentSlot::RegistrationGap, &self.registration_gap),
            (DocumentSlot::RegistrationEul, &self.registration_eul),
        ] {
            if let Some(path) = path {
                let document = DocumentFile::from_path(&self.resolve(path)).await?;
                fields.push(FormField::Document(slot, Some(document)));
            }
        }

        fields.push(FormField::AccidentDescription(self.accident_desc.clone()));
        fields.push(FormField::Mileage(self.current_mileage.clone()));
        if let Some(flooded) = self.is_flooded {
            fields.push(FormField::Flooded(FloodStatus::from(flooded)));
        }
        fields.push(FormField::ConditionNotes(self.issue_details.clone()));

        Ok(fields)
    }
}

// 里程既可以写成字符串也可以写成整数
fn deserialize_mileage<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct MileageVisitor;

    impl<'de> Visitor<'de> for MileageVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer representing mileage")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(MileageVisitor)
}
