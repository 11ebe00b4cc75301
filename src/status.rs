/// Per element bit flags.
///
/// The deleted flag is owned by the mesh and can only be changed through the
/// delete operations. The remaining flags are free for callers to use, and
/// travel with their element when the mesh is garbage collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    flags: u8,
}

const DELETED: u8 = 1 << 0;
const LOCKED: u8 = 1 << 1;
const SELECTED: u8 = 1 << 2;
const FEATURE: u8 = 1 << 3;
const TAGGED: u8 = 1 << 4;

impl Status {
    fn check(&self, bit: u8) -> bool {
        self.flags & bit != 0
    }

    fn set(&mut self, bit: u8, flag: bool) {
        if flag {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    pub fn deleted(&self) -> bool {
        self.check(DELETED)
    }

    pub(crate) fn set_deleted(&mut self, flag: bool) {
        self.set(DELETED, flag);
    }

    pub fn locked(&self) -> bool {
        self.check(LOCKED)
    }

    pub fn set_locked(&mut self, flag: bool) {
        self.set(LOCKED, flag)
    }

    pub fn selected(&self) -> bool {
        self.check(SELECTED)
    }

    pub fn set_selected(&mut self, flag: bool) {
        self.set(SELECTED, flag)
    }

    pub fn feature(&self) -> bool {
        self.check(FEATURE)
    }

    pub fn set_feature(&mut self, flag: bool) {
        self.set(FEATURE, flag)
    }

    pub fn tagged(&self) -> bool {
        self.check(TAGGED)
    }

    pub fn set_tagged(&mut self, flag: bool) {
        self.set(TAGGED, flag)
    }
}
