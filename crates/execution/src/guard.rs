use crate::error::{VaultError, VaultResult};

/// Non-reentrant execution lock held for the whole of a mutating call.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    pub fn enter(&mut self) -> VaultResult<()> {
        if self.entered {
            return Err(VaultError::ReentrantCall);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_enter_fails() {
        let mut guard = ReentrancyGuard::default();
        guard.enter().unwrap();
        assert_eq!(guard.enter(), Err(VaultError::ReentrantCall));

        guard.exit();
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }
}
