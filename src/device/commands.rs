use super::{BufferId, FramebufferId, PipelineId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin,
    SetFramebuffer(FramebufferId),
    ClearColorTarget {
        index: u32,
        color: [f32; 4],
    },
    SetPipeline(PipelineId),
    SetVertexBuffer {
        slot: u32,
        buffer: BufferId,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Recording,
    Finished,
}

/// An ordered batch of commands, recorded on the host and replayed by the
/// device on submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandList {
    commands: Vec<Command>,
    state: State,
}

impl CommandList {
    pub fn new() -> Self {
        CommandList {
            commands: Vec::new(),
            state: State::Idle,
        }
    }

    /// Starts a new recording, discarding whatever the list held before.
    pub fn begin(&mut self) {
        self.commands.clear();
        self.state = State::Recording;
        self.commands.push(Command::Begin);
    }

    pub fn set_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.push(Command::SetFramebuffer(framebuffer));
    }

    pub fn clear_color_target(&mut self, index: u32, color: [f32; 4]) {
        self.push(Command::ClearColorTarget { index, color });
    }

    pub fn set_pipeline(&mut self, pipeline: PipelineId) {
        self.push(Command::SetPipeline(pipeline));
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        self.push(Command::SetVertexBuffer { slot, buffer });
    }

    pub fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        self.push(Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
    }

    pub fn end(&mut self) {
        self.push(Command::End);
        self.state = State::Finished;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// True once `end` has closed a recording started by `begin`.
    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    fn push(&mut self, command: Command) {
        debug_assert_eq!(
            self.state,
            State::Recording,
            "command recorded outside begin/end"
        );
        self.commands.push(command);
    }
}

impl Default for CommandList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_discards_previous_recording() {
        let mut list = CommandList::new();
        list.begin();
        list.draw(3, 1, 0, 0);
        list.end();
        assert!(list.is_finished());

        list.begin();
        assert_eq!(list.commands(), &[Command::Begin]);
        assert!(!list.is_finished());
    }

    #[test]
    fn fresh_list_is_not_finished() {
        let list = CommandList::default();
        assert!(!list.is_finished());
        assert!(list.commands().is_empty());
    }

    #[test]
    #[should_panic(expected = "outside begin/end")]
    #[cfg(debug_assertions)]
    fn recording_without_begin_panics_in_debug() {
        let mut list = CommandList::new();
        list.set_pipeline(PipelineId(0));
    }
}
