use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct WorkflowState {
    pub completed_files: Vec<String>,
}

impl WorkflowState {
    pub fn is_completed(&self, filename: &str) -> bool {
        self.completed_files.iter().any(|f| f == filename)
    }

    pub fn mark_completed(&mut self, filename: impl Into<String>) {
        let filename = filename.into();
        if !self.is_completed(&filename) {
            self.completed_files.push(filename);
        }
    }

    pub fn forget(&mut self, matches: impl Fn(&str) -> bool) {
        self.completed_files.retain(|f| !matches(f));
    }
}
