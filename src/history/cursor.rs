//! 历史浏览游标

use serde::{Deserialize, Serialize};

/// 浏览方向（对应方向键上/下）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryDirection {
    Up,
    Down,
}

/// 每个会话一个游标
///
/// `index` 为 `None` 表示未在浏览；开始浏览时记下当时输入的草稿，
/// 越过最新一条时恢复。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    index: Option<usize>,
    draft: String,
}

impl HistoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_browsing(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn reset(&mut self) {
        self.index = None;
        self.draft.clear();
    }

    /// 移动游标，返回输入框应显示的文本；`None` 表示不处理该按键
    pub fn navigate(
        &mut self,
        direction: HistoryDirection,
        history: &[String],
        current_input: &str,
    ) -> Option<String> {
        if history.is_empty() {
            return None;
        }
        let last = history.len() - 1;

        match direction {
            HistoryDirection::Up => {
                let index = match self.index {
                    None => {
                        self.draft = current_input.to_string();
                        last
                    }
                    Some(i) => i.min(last).saturating_sub(1),
                };
                self.index = Some(index);
                Some(history[index].clone())
            }
            HistoryDirection::Down => {
                let i = self.index?.min(last);
                if i < last {
                    self.index = Some(i + 1);
                    Some(history[i + 1].clone())
                } else {
                    self.index = None;
                    Some(self.draft.clone())
                }
            }
        }
    }
}
