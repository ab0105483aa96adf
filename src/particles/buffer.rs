//! 双缓冲粒子存储
//!
//! 两个等容量的粒子数组按 front/back 角色轮换：
//!
//! ```text
//!   frame N                         frame N+1
//! ┌──────────┐  read   ┌──────────┐     ┌──────────┐
//! │  front   │───────►│  back    │ ==> │  front   │  (swap_roles)
//! │ (slot A) │ workers│ (slot B) │     │ (slot B) │
//! └──────────┘        └──────────┘     └──────────┘
//! ```
//!
//! `[0, live_count)` 槽位在两个数组中同步占用；除 `position` 以外的字段
//! 只在生成和剔除时写入，并且总是同时写入两个数组。

use super::particle::Particle;
use std::cell::UnsafeCell;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

/// 物理缓冲区槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Slot {
    A = 0,
    B = 1,
}

impl Slot {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub(crate) fn from_u8(raw: u8) -> Self {
        if raw == 0 {
            Self::A
        } else {
            Self::B
        }
    }
}

/// 缓冲区角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// 可读稳定：渲染与本帧物理输入
    Front,
    /// 可写：本帧由工作线程写入
    Back,
}

/// 两个共享的粒子数组
///
/// 元素包在 `UnsafeCell` 中，访问协议由 [`ParticleStore`] 与
/// [`crate::parallel::WorkerPool`] 维护：
/// - 协调阶段只有协调线程访问两个数组；
/// - 计算阶段 front 只读，back 按分区切分给各工作线程独占写入。
pub(crate) struct DoubleBuffer {
    slots: [Box<[UnsafeCell<Particle>]>; 2],
}

// SAFETY: 所有对元素的访问都经由上面的阶段协议串行化或按不相交区间划分，
// 见 `advance`、`slice` 与 `slice_mut` 的前置条件。
unsafe impl Sync for DoubleBuffer {}

impl DoubleBuffer {
    fn new(capacity: usize) -> Self {
        let make = || {
            (0..capacity)
                .map(|_| UnsafeCell::new(Particle::default()))
                .collect::<Box<[_]>>()
        };
        Self {
            slots: [make(), make()],
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots[0].len()
    }

    /// `back[i].position = front[i].position + front[i].velocity * dt`
    ///
    /// # Safety
    ///
    /// 调用期间：`range` 内的 back 元素没有其他读写者；
    /// `range` 内的 front 元素没有写者。`range` 必须在容量之内。
    pub(crate) unsafe fn advance(&self, front: Slot, range: Range<usize>, dt: f32) {
        let src = &self.slots[front.index()][range.clone()];
        let dst = &self.slots[front.other().index()][range];
        for (src, dst) in src.iter().zip(dst) {
            let src = &*src.get();
            (*dst.get()).position = src.integrated_position(dt);
        }
    }

    /// # Safety
    ///
    /// 返回引用存活期间，`slot` 的前 `len` 个元素没有写者。
    #[inline]
    unsafe fn slice(&self, slot: Slot, len: usize) -> &[Particle] {
        let cells = &self.slots[slot.index()][..len];
        std::slice::from_raw_parts(UnsafeCell::raw_get(cells.as_ptr()), len)
    }

    /// # Safety
    ///
    /// 返回引用存活期间，`slot` 的前 `len` 个元素没有其他读写者。
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn slice_mut(&self, slot: Slot, len: usize) -> &mut [Particle] {
        let cells = &self.slots[slot.index()][..len];
        std::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), len)
    }
}

/// 粒子存储
///
/// 把角色、存活数量和两个数组捆绑在一起，唯一的修改入口是
/// [`swap_roles`](Self::swap_roles)、[`cull`](Self::cull)、
/// [`spawn`](Self::spawn) 和 [`advance_all`](Self::advance_all)，
/// 每个入口返回时两个数组的 `[0, live_count)` 都保持同步。
///
/// 交给 [`crate::parallel::WorkerPool`] 之后，可变访问只能通过
/// 工作线程全部空闲时才存在的 [`crate::parallel::Quiesced`] 获得；
/// 共享访问只读取 front，计算阶段也是安全的。
pub struct ParticleStore {
    buffers: Arc<DoubleBuffer>,
    front: Slot,
    live: usize,
}

impl ParticleStore {
    /// 创建指定容量的空存储
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            buffers: Arc::new(DoubleBuffer::new(capacity.get())),
            front: Slot::A,
            live: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffers.capacity()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live == self.capacity()
    }

    /// 指定角色对应的物理槽位
    #[inline]
    pub fn slot(&self, role: Role) -> Slot {
        match role {
            Role::Front => self.front,
            Role::Back => self.front.other(),
        }
    }

    /// front 缓冲区中的存活粒子 `[0, live_count)`
    pub fn live(&self) -> &[Particle] {
        // SAFETY: front 在任何阶段都没有写者：计算阶段工作线程只写 back，
        // 协调阶段的写入需要 `&mut self`。
        unsafe { self.buffers.slice(self.front, self.live) }
    }

    /// 交换 front/back 角色，O(1)
    pub fn swap_roles(&mut self) {
        self.front = self.front.other();
    }

    /// 剔除在 `now` 时刻已过期的粒子，返回剔除数量
    ///
    /// 使用swap-remove：最后一个存活槽位搬入空位（两个数组同时搬移），
    /// 搬入的粒子会被重新检查。存活粒子的顺序不保留。
    pub fn cull(&mut self, now: f64) -> usize {
        let (front, back) = self.both_mut();
        let mut live = front.len();
        let mut index = 0;
        while index < live {
            if front[index].is_alive(now) {
                index += 1;
                continue;
            }
            live -= 1;
            front.swap(index, live);
            back.swap(index, live);
        }

        let culled = self.live - live;
        self.live = live;
        culled
    }

    /// 在 `live_count` 槽位写入新粒子（两个数组同时写入）
    ///
    /// 已满时返回 `None`，否则返回写入的槽位。
    pub fn spawn(&mut self, particle: Particle) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let index = self.live;
        let capacity = self.capacity();
        // SAFETY: `&mut self` 保证没有并发访问者，索引小于容量。
        unsafe {
            self.buffers.slice_mut(self.front, capacity)[index] = particle;
            self.buffers.slice_mut(self.front.other(), capacity)[index] = particle;
        }
        self.live += 1;
        Some(index)
    }

    /// 在当前线程积分全部存活粒子（front → back），不交换角色
    pub fn advance_all(&mut self, dt: f32) {
        // SAFETY: `&mut self` 保证没有工作线程持有任一数组。
        unsafe { self.buffers.advance(self.front, 0..self.live, dt) }
    }

    /// 清空所有粒子
    pub fn clear(&mut self) {
        self.live = 0;
    }

    fn both_mut(&mut self) -> (&mut [Particle], &mut [Particle]) {
        // SAFETY: `&mut self` 保证独占访问；两个槽位是不同的分配。
        unsafe {
            (
                self.buffers.slice_mut(self.front, self.live),
                self.buffers.slice_mut(self.front.other(), self.live),
            )
        }
    }

    pub(crate) fn shared_buffers(&self) -> Arc<DoubleBuffer> {
        Arc::clone(&self.buffers)
    }

    #[cfg(test)]
    pub(crate) fn back_live(&self) -> &[Particle] {
        // SAFETY: 只在没有工作线程的单元测试中使用。
        unsafe { self.buffers.slice(self.front.other(), self.live) }
    }
}

impl std::fmt::Debug for ParticleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleStore")
            .field("capacity", &self.capacity())
            .field("live", &self.live)
            .field("front", &self.front)
            .finish()
    }
}
