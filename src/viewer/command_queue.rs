use winit::window::CursorIcon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    SetCursor(CursorIcon),
    /// Resize once the container layout has settled.
    ScheduleResize,
    RequestFrame,
}

/**
 * Queue for side effects (cursor changes, deferred resizes, redraw requests)
 * produced while handling an event. They reach the host and the render loop
 * after the handler has finished mutating viewer state.
 */
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<ViewerCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn queue_set_cursor(&mut self, cursor: CursorIcon) {
        // Only the last cursor of a batch is visible to the user.
        self.commands.retain(|c| !matches!(c, ViewerCommand::SetCursor(_)));
        self.commands.push(ViewerCommand::SetCursor(cursor));
    }

    pub fn queue_schedule_resize(&mut self) {
        self.commands.push(ViewerCommand::ScheduleResize);
    }

    pub fn queue_request_frame(&mut self) {
        if !self.commands.contains(&ViewerCommand::RequestFrame) {
            self.commands.push(ViewerCommand::RequestFrame);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[ViewerCommand] {
        &self.commands
    }

    /// Take every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<ViewerCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_updates_collapse_to_the_latest() {
        let mut q = CommandQueue::new();
        q.queue_set_cursor(CursorIcon::Grab);
        q.queue_schedule_resize();
        q.queue_set_cursor(CursorIcon::Grabbing);
        q.queue_request_frame();
        q.queue_request_frame();
        assert_eq!(
            q.drain(),
            vec![
                ViewerCommand::ScheduleResize,
                ViewerCommand::SetCursor(CursorIcon::Grabbing),
                ViewerCommand::RequestFrame,
            ]
        );
        assert!(q.is_empty());
    }
}
