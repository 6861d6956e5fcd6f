use autorunner_common::{BlockHandle, TemplateId, Transform};
use std::collections::VecDeque;

/// A block that passed its obstruction probe and is part of the track ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveBlock {
    pub handle: BlockHandle,
    pub template: TemplateId,
    pub name: String,
    pub outs: u32,
}

impl LiveBlock {
    pub fn is_fork(&self) -> bool {
        self.outs >= 2
    }
}

/// Live blocks in track order plus the anchor the next block attaches to.
///
/// Blocks leave the front of the chain when the path walk consumes them and
/// move to the retired queue, where they wait for cleanup.
#[derive(Debug, Clone)]
pub struct BlockChain {
    live: VecDeque<LiveBlock>,
    retired: VecDeque<BlockHandle>,
    anchor: Transform,
}

impl BlockChain {
    pub fn new(anchor: Transform) -> Self {
        Self {
            live: VecDeque::new(),
            retired: VecDeque::new(),
            anchor,
        }
    }

    pub fn anchor(&self) -> Transform {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Transform) {
        self.anchor = anchor;
    }

    pub fn push(&mut self, block: LiveBlock) {
        self.live.push_back(block);
    }

    pub fn front(&self) -> Option<&LiveBlock> {
        self.live.front()
    }

    pub fn back(&self) -> Option<&LiveBlock> {
        self.live.back()
    }

    /// Move the front block to the retired queue.
    pub fn retire_front(&mut self) -> Option<LiveBlock> {
        let block = self.live.pop_front()?;
        self.retired.push_back(block.handle);
        Some(block)
    }

    /// Oldest retired block, removed from the queue.
    pub fn pop_retired(&mut self) -> Option<BlockHandle> {
        self.retired.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveBlock> {
        self.live.iter()
    }

    pub fn retired(&self) -> impl Iterator<Item = &BlockHandle> {
        self.retired.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    pub fn contains(&self, handle: BlockHandle) -> bool {
        self.live.iter().any(|b| b.handle == handle)
    }

    /// Empty both queues and reset the anchor, returning every handle that was held.
    pub fn clear(&mut self, anchor: Transform) -> Vec<BlockHandle> {
        let mut handles: Vec<BlockHandle> = self.retired.drain(..).collect();
        handles.extend(self.live.drain(..).map(|b| b.handle));
        self.anchor = anchor;
        handles
    }
}
