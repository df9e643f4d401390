use std::path::PathBuf;

use crate::activation::activation::ActivationFunction;

pub const DEFAULT_MODEL_DIR: &str = "trained-models";
pub const DEFAULT_MODEL_NAME: &str = "default";

/// Where persisted models live.
///
/// Each activation gets its own file, `<dir>/<name>.<activation>.model.json`,
/// since weights trained for one nonlinearity are meaningless under another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    pub dir: PathBuf,
    pub name: String,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(dir: P, name: S) -> ModelStore {
        ModelStore { dir: dir.into(), name: name.into() }
    }

    pub fn path_for(&self, activation: ActivationFunction) -> PathBuf {
        self.dir.join(format!("{}.{}.model.json", self.name, activation))
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        ModelStore::new(DEFAULT_MODEL_DIR, DEFAULT_MODEL_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_includes_activation() {
        let store = ModelStore::new("models", "digits");
        assert_eq!(
            store.path_for(ActivationFunction::Sigmoid),
            PathBuf::from("models/digits.sigmoid.model.json")
        );
        assert_eq!(
            ModelStore::default().path_for(ActivationFunction::ReLU),
            PathBuf::from("trained-models/default.relu.model.json")
        );
    }
}
