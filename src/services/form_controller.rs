//! 表单状态控制器 - 业务能力层
//!
//! 只负责字段写入、步骤校验和步骤切换，没有任何网络或 I/O

use tracing::{debug, warn};

use crate::models::form::{DocumentSlot, FormField, FormState, Step};

/// 两步表单控制器
#[derive(Debug, Clone)]
pub struct FormController {
    state: FormState,
    step: Step,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self {
            state: FormState::default(),
            step: Step::FIRST,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    /// 写入单个字段
    ///
    /// 里程只保留数字字符
    pub fn set_field(&mut self, field: FormField) {
        match field {
            FormField::Document(slot, file) => {
                match &file {
                    Some(doc) => debug!("选择证件 {}: {} ({} bytes)", slot.field_name(), doc.file_name, doc.len()),
                    None => debug!("清除证件 {}", slot.field_name()),
                }
                match slot {
                    DocumentSlot::RegistrationGap => self.state.required_document = file,
                    DocumentSlot::RegistrationEul => self.state.optional_document = file,
                }
            }
            FormField::AccidentDescription(text) => self.state.accident_description = text,
            FormField::Mileage(raw) => {
                let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
                if digits.len() != raw.len() {
                    debug!("里程输入包含非数字字符，已过滤");
                }
                self.state.mileage = digits;
            }
            FormField::Flooded(status) => self.state.flood_status = status,
            FormField::ConditionNotes(text) => self.state.condition_notes = text,
        }
    }

    /// 指定步骤的必填项是否完成
    pub fn can_advance(&self, step: Step) -> bool {
        match step {
            Step::Documents => self.state.required_document.is_some(),
            Step::VehicleInfo => {
                !self.state.mileage.is_empty() && self.state.flood_status.is_set()
            }
        }
    }

    /// 前进一步
    ///
    /// # 返回
    /// 步骤是否发生变化
    pub fn next(&mut self) -> bool {
        if !self.can_advance(self.step) {
            warn!("⚠️ 第 {} 步({})尚未完成，无法前进", self.step, self.step.label());
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// 后退一步，第一步时无操作
    pub fn prev(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// 通过步骤指示器跳转，只允许回到更早的步骤
    pub fn go_to(&mut self, step: Step) -> bool {
        if step < self.step {
            self.step = step;
            true
        } else {
            false
        }
    }

    /// 是否可以提交
    ///
    /// 必须在最后一步，且必填证件和第 2 步信息都已完成
    pub fn can_submit(&self) -> bool {
        self.step == Step::LAST
            && self.can_advance(Step::Documents)
            && self.can_advance(Step::VehicleInfo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::{DocumentFile, FloodStatus};

    fn gap() -> FormField {
        FormField::Document(
            DocumentSlot::RegistrationGap,
            Some(DocumentFile::new("gap.pdf", vec![1]).unwrap()),
        )
    }

    #[test]
    fn step_one_requires_required_document() {
        let mut form = FormController::new();
        assert!(!form.can_advance(Step::Documents));

        form.set_field(FormField::Document(
            DocumentSlot::RegistrationEul,
            Some(DocumentFile::new("eul.png", vec![1]).unwrap()),
        ));
        assert!(!form.can_advance(Step::Documents));

        form.set_field(gap());
        assert!(form.can_advance(Step::Documents));

        form.set_field(FormField::Document(DocumentSlot::RegistrationGap, None));
        assert!(!form.can_advance(Step::Documents));
    }

    #[test]
    fn step_two_requires_mileage_and_flood_status() {
        let mut form = FormController::new();
        assert!(!form.can_advance(Step::VehicleInfo));

        form.set_field(FormField::Mileage("1200".into()));
        assert!(!form.can_advance(Step::VehicleInfo));

        form.set_field(FormField::Flooded(FloodStatus::NotFlooded));
        assert!(form.can_advance(Step::VehicleInfo));

        form.set_field(FormField::Mileage(String::new()));
        assert!(!form.can_advance(Step::VehicleInfo));
    }

    #[test]
    fn next_never_moves_when_step_incomplete() {
        let mut form = FormController::new();
        assert!(!form.next());
        assert_eq!(form.current_step(), Step::Documents);

        form.set_field(gap());
        assert!(form.next());
        assert_eq!(form.current_step(), Step::VehicleInfo);

        // 最后一步即使完成也不再前进
        form.set_field(FormField::Mileage("1".into()));
        form.set_field(FormField::Flooded(FloodStatus::Flooded));
        assert!(!form.next());
        assert_eq!(form.current_step(), Step::VehicleInfo);
    }

    #[test]
    fn mileage_keeps_only_digits() {
        let mut form = FormController::new();
        form.set_field(FormField::Mileage("12,345 km".into()));
        assert_eq!(form.state().mileage, "12345");

        form.set_field(FormField::Mileage("약 삼만".into()));
        assert_eq!(form.state().mileage, "");

        form.set_field(FormField::Mileage("٣4".into()));
        assert_eq!(form.state().mileage, "4");
    }

    #[test]
    fn prev_and_go_to_only_move_backwards() {
        let mut form = FormController::new();
        assert!(!form.prev());
        assert!(!form.go_to(Step::VehicleInfo));

        form.set_field(gap());
        form.next();
        assert!(!form.go_to(Step::VehicleInfo));
        assert!(form.go_to(Step::Documents));
        assert_eq!(form.current_step(), Step::Documents);

        form.next();
        assert!(form.prev());
        assert_eq!(form.current_step(), Step::Documents);
    }

    #[test]
    fn submit_requires_last_step_and_all_fields() {
        let mut form = FormController::new();
        form.set_field(gap());
        form.set_field(FormField::Mileage("30000".into()));
        form.set_field(FormField::Flooded(FloodStatus::NotFlooded));
        assert!(!form.can_submit());

        form.next();
        assert!(form.can_submit());

        form.set_field(FormField::Document(DocumentSlot::RegistrationGap, None));
        assert!(!form.can_submit());
    }
}
