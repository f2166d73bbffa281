//! 表单数据模型
//!
//! 两步表单：第 1 步上传登记证（갑/을），第 2 步填写车辆信息

use std::fmt;
use std::path::Path;

use crate::error::{AppError, AppResult, FileError};

/// 允许上传的证件扩展名
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

/// 表单步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// 서류 업로드
    Documents = 1,
    /// 차량 정보
    VehicleInfo = 2,
}

impl Step {
    pub const FIRST: Step = Step::Documents;
    pub const LAST: Step = Step::VehicleInfo;

    /// 步骤序号（从 1 开始）
    pub fn index(self) -> u8 {
        self as u8
    }

    /// 步骤指示器上的标签
    pub fn label(self) -> &'static str {
        match self {
            Step::Documents => "서류 업로드",
            Step::VehicleInfo => "차량 정보",
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Step::Documents),
            2 => Some(Step::VehicleInfo),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// 证件槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    /// 자동차등록원부 (갑)，必填
    RegistrationGap,
    /// 자동차등록원부 (을)，选填
    RegistrationEul,
}

impl DocumentSlot {
    /// multipart 中的字段名
    pub fn field_name(self) -> &'static str {
        match self {
            DocumentSlot::RegistrationGap => "registrationGap",
            DocumentSlot::RegistrationEul => "registrationEul",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentSlot::RegistrationGap => "자동차등록원부 (갑)",
            DocumentSlot::RegistrationEul => "자동차등록원부 (을)",
        }
    }
}

/// 침수 여부（三态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloodStatus {
    #[default]
    Unset,
    NotFlooded,
    Flooded,
}

impl FloodStatus {
    pub fn is_set(self) -> bool {
        !matches!(self, FloodStatus::Unset)
    }

    /// 提交时的取值，未选择按 "false" 处理
    pub fn as_form_value(self) -> &'static str {
        match self {
            FloodStatus::Flooded => "true",
            FloodStatus::NotFlooded | FloodStatus::Unset => "false",
        }
    }
}

impl From<bool> for FloodStatus {
    fn from(flooded: bool) -> Self {
        if flooded {
            FloodStatus::Flooded
        } else {
            FloodStatus::NotFlooded
        }
    }
}

/// 已选择的证件文件
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    /// 创建内存中的证件文件，扩展名必须在允许列表内
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name)
            .ok_or_else(|| unsupported(&file_name))?
            .to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// 从磁盘读取证件
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| FileError::NotFound {
                path: display.clone(),
            })?;

        // 先校验类型再读文件
        if mime_for(&file_name).is_none() {
            return Err(unsupported(&display));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::File(FileError::NotFound {
                    path: display.clone(),
                })
            } else {
                AppError::file_read_failed(&display, e)
            }
        })?;

        Self::new(file_name, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    match extension_of(file_name)?.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

fn unsupported(path: &str) -> AppError {
    AppError::File(FileError::UnsupportedDocumentType {
        path: path.to_string(),
        extension: extension_of(path).unwrap_or_default(),
    })
}

/// 表单状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub required_document: Option<DocumentFile>,
    pub optional_document: Option<DocumentFile>,
    pub accident_description: String,
    /// 只含数字
    pub mileage: String,
    pub flood_status: FloodStatus,
    pub condition_notes: String,
}

impl FormState {
    pub fn document(&self, slot: DocumentSlot) -> Option<&DocumentFile> {
        match slot {
            DocumentSlot::RegistrationGap => self.required_document.as_ref(),
            DocumentSlot::RegistrationEul => self.optional_document.as_ref(),
        }
    }
}

/// setField 的键值
#[derive(Debug, Clone)]
pub enum FormField {
    /// 选择或清除某个证件
    Document(DocumentSlot, Option<DocumentFile>),
    AccidentDescription(String),
    /// 原始输入，写入时只保留数字
    Mileage(String),
    Flooded(FloodStatus),
    ConditionNotes(String),
}
