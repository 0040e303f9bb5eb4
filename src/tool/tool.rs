//! Tool trait for editor tools
//!
//! Tools have an activation lifecycle and an identity (id, label) for UI
//! and scripting.

/// Base trait for all tools
///
/// Tools are stateful objects that can be activated and deactivated.
/// Only active tools receive input and draw their handles.
///
/// # Lifecycle
///
/// ```text
/// [Inactive] --activate()--> [Active] --deactivate()--> [Inactive]
///                ^                          |
///                |     (can fail)           |
///                +--------------------------+
/// ```
pub trait Tool {
    /// Unique identifier for this tool (e.g., "scale_objects")
    fn id(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str;

    /// Whether this tool is currently active
    fn active(&self) -> bool;

    /// Attempt to activate the tool.
    ///
    /// Returns `false` if the tool was already active or refused.
    /// Override `do_activate()` for custom activation logic.
    fn activate(&mut self) -> bool {
        if self.active() {
            return false;
        }
        self.do_activate()
    }

    /// Attempt to deactivate the tool.
    ///
    /// Returns `false` if the tool was already inactive or refused.
    /// Override `do_deactivate()` for custom cleanup.
    fn deactivate(&mut self) -> bool {
        if !self.active() {
            return false;
        }
        self.do_deactivate()
    }

    /// Should set `active = true`. Return `false` to deny activation.
    fn do_activate(&mut self) -> bool {
        true
    }

    /// Should set `active = false` and abandon any operation in progress.
    fn do_deactivate(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingTool {
        active: bool,
        activations: u32,
        deactivations: u32,
        allow_activation: bool,
    }

    impl Tool for CountingTool {
        fn id(&self) -> &'static str { "counting" }
        fn label(&self) -> &'static str { "Counting" }
        fn active(&self) -> bool { self.active }

        fn do_activate(&mut self) -> bool {
            if !self.allow_activation {
                return false;
            }
            self.active = true;
            self.activations += 1;
            true
        }

        fn do_deactivate(&mut self) -> bool {
            self.active = false;
            self.deactivations += 1;
            true
        }
    }

    fn tool(allow_activation: bool) -> CountingTool {
        CountingTool { active: false, activations: 0, deactivations: 0, allow_activation }
    }

    #[test]
    fn test_activation_lifecycle() {
        let mut tool = tool(true);

        assert!(tool.activate());
        assert!(tool.active());
        // Can't activate twice
        assert!(!tool.activate());
        assert_eq!(tool.activations, 1);

        assert!(tool.deactivate());
        assert!(!tool.deactivate());
        assert_eq!(tool.deactivations, 1);
    }

    #[test]
    fn test_activation_can_be_refused() {
        let mut tool = tool(false);
        assert!(!tool.activate());
        assert!(!tool.active());
    }
}
