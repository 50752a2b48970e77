#![cfg(feature = "alloc")]

use core::alloc::Layout;
use core::cell::Cell;
use core::marker::PhantomData as Cfg;
use core::ptr::NonNull;
use std::rc::Rc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rstest::rstest;

use dyn_array::{
    alloc::{AllocError, Allocator, AllocatorDefault, Global},
    array::{ArrayConfig, Custom, DynArray},
    capacity::{GrowDoubling, GrowExact},
    dyn_array, StorageError,
};

const SLICE: &[usize] = &[1, 2, 3, 4, 5];

#[derive(Debug, Default)]
struct CountingAlloc {
    allocs: Cell<usize>,
    grows: Cell<usize>,
    frees: Cell<usize>,
}

impl CountingAlloc {
    fn calls(&self) -> usize {
        self.allocs.get() + self.grows.get() + self.frees.get()
    }
}

unsafe impl Allocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.allocs.set(self.allocs.get() + 1);
        Global.allocate(layout)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        self.grows.set(self.grows.get() + 1);
        Global.grow(ptr, old_layout, new_layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.frees.set(self.frees.get() + 1);
        Global.deallocate(ptr, layout)
    }
}

/// Fails any request for more than `max_size` bytes.
#[derive(Debug, Clone, Copy)]
struct LimitAlloc {
    max_size: usize,
}

unsafe impl Allocator for LimitAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() > self.max_size {
            return Err(AllocError);
        }
        Global.allocate(layout)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        if new_layout.size() > self.max_size {
            return Err(AllocError);
        }
        Global.grow(ptr, old_layout, new_layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        Global.deallocate(ptr, layout)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Zst;

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::initial_4(Cfg::<Custom<Global, GrowDoubling<4>>>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn array_new<C: ArrayConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let arr = DynArray::<usize, C>::new();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 0);
    let arr = DynArray::<usize, C>::default();
    assert_eq!(arr.len(), 0);
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::initial_4(Cfg::<Custom<Global, GrowDoubling<4>>>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn array_append<C: ArrayConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let mut arr = DynArray::<usize, C>::new();
    for idx in 0..100 {
        arr.append(idx);
        assert_eq!(arr.len(), idx + 1);
        assert_eq!(arr[idx], idx);
    }
    assert!(arr.capacity() >= 100);
    assert!(arr.iter().copied().eq(0..100));
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::initial_4(Cfg::<Custom<Global, GrowDoubling<4>>>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn array_append_many<C: ArrayConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let mut many = DynArray::<usize, C>::new();
    many.append_many(SLICE);
    let mut single = DynArray::<usize, C>::new();
    for item in SLICE {
        single.append(*item);
    }
    assert_eq!(many, single);
    assert_eq!(many, SLICE);
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::initial_4(Cfg::<Custom<Global, GrowDoubling<4>>>)]
fn array_zst<C: ArrayConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    let mut arr = DynArray::<Zst, C>::new();
    arr.append_many(&[Zst; 20]);
    assert_eq!(arr.len(), 20);
    assert_eq!(arr.capacity(), usize::MAX);
    assert_eq!(arr.remove_unordered(3), Zst);
    assert_eq!(arr.len(), 19);
}

#[rstest]
#[case::global(Cfg::<Global>)]
#[case::initial_4(Cfg::<Custom<Global, GrowDoubling<4>>>)]
#[case::exact(Cfg::<Custom<Global, GrowExact>>)]
fn array_zst_reserve_any_count<C: ArrayConfig>(#[case] _config: Cfg<C>)
where
    C::Alloc: AllocatorDefault,
{
    // an unallocated array accepts the same counts as one that has grown
    let mut fresh = DynArray::<Zst, C>::new();
    assert_eq!(fresh.try_reserve(usize::MAX), Ok(()));
    assert_eq!(fresh.capacity(), usize::MAX);
    assert!(fresh.is_empty());

    let mut grown = DynArray::<Zst, C>::new();
    grown.append(Zst);
    assert_eq!(grown.try_reserve(usize::MAX), Ok(()));
    assert_eq!(grown.capacity(), fresh.capacity());
}

#[test]
fn array_eleven_appends() {
    let mut arr = DynArray::<usize>::new();
    for idx in 0..11 {
        arr.append(idx);
    }
    assert_eq!(arr.len(), 11);
    assert_eq!(arr.capacity(), 20);
    for idx in 0..11 {
        assert_eq!(arr[idx], idx);
    }
}

#[test]
fn array_capacity_growth() {
    let mut res = [0usize; 12];
    let mut arr = DynArray::<usize, Custom<Global, GrowDoubling<2>>>::new();
    for cap in res.iter_mut() {
        arr.append(1);
        *cap = arr.capacity();
    }
    assert_eq!(res, [2, 2, 4, 4, 8, 8, 8, 8, 16, 16, 16, 16]);

    let mut res = [0usize; 4];
    let mut arr = DynArray::<usize, Custom<Global, GrowExact>>::new();
    for cap in res.iter_mut() {
        arr.append(1);
        *cap = arr.capacity();
    }
    assert_eq!(res, [1, 2, 3, 4]);
}

#[test]
fn array_capacity_monotonic() {
    let mut arr = DynArray::<u8>::new();
    let mut prev = arr.capacity();
    for round in 0..3 {
        for idx in 0..(50 * round) {
            arr.append(idx as u8);
            assert!(arr.capacity() >= prev);
            prev = arr.capacity();
        }
        arr.reset();
        assert_eq!(arr.capacity(), prev);
    }
    assert_eq!(prev, 160);
}

#[test]
fn array_reserve() {
    let mut arr = DynArray::<u32>::new();
    arr.reserve(0);
    assert_eq!(arr.capacity(), 0);
    arr.reserve(3);
    assert_eq!(arr.capacity(), 10);
    arr.reserve(10);
    assert_eq!(arr.capacity(), 10);
    arr.reserve(11);
    assert_eq!(arr.capacity(), 20);
    // doubling continues from the current capacity
    arr.reserve(50);
    assert_eq!(arr.capacity(), 80);
    arr.reserve(5);
    assert_eq!(arr.capacity(), 80);
    assert!(arr.is_empty());

    let mut arr = DynArray::<u32>::new();
    arr.reserve(25);
    assert_eq!(arr.capacity(), 40);
}

#[test]
fn array_with_capacity() {
    let arr = DynArray::<usize>::with_capacity(0);
    assert_eq!(arr.capacity(), 0);
    let arr = DynArray::<usize>::with_capacity(12);
    assert_eq!(arr.capacity(), 20);
    let arr = DynArray::<usize, Global>::with_capacity_in(5, Global);
    assert_eq!(arr.capacity(), 10);
}

#[test]
fn array_reserve_limit() {
    let mut arr = DynArray::<u64>::from([1, 2]);
    assert_eq!(
        arr.try_reserve(usize::MAX),
        Err(StorageError::CapacityLimit)
    );
    assert!(matches!(
        DynArray::<u64, Custom<Global, GrowExact>>::try_with_capacity(usize::MAX),
        Err(StorageError::LayoutError(_))
    ));
    assert_eq!(arr, [1, 2]);
    assert_eq!(arr.capacity(), 10);
}

#[test]
#[should_panic(expected = "Exceeded storage capacity limit")]
fn array_reserve_limit_panics() {
    let mut arr = DynArray::<u64>::new();
    arr.reserve(usize::MAX);
}

#[test]
fn array_reserve_sufficient_no_alloc() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<u32, &CountingAlloc>::with_capacity_in(10, &alloc);
    assert_eq!(alloc.allocs.get(), 1);
    arr.reserve(7);
    arr.append_many(&[1; 10]);
    assert_eq!(alloc.calls(), 1);
}

#[test]
fn array_append_many_empty_no_alloc() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<u32, &CountingAlloc>::new_in(&alloc);
    arr.append_many(&[]);
    assert_eq!(arr.len(), 0);
    assert_eq!(arr.capacity(), 0);
    arr.free();
    assert_eq!(alloc.calls(), 0);
}

#[test]
fn array_append_many_single_growth() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<usize, &CountingAlloc>::new_in(&alloc);
    arr.append(0);
    arr.append_many(&[7; 30]);
    assert_eq!(arr.capacity(), 40);
    assert_eq!(alloc.allocs.get(), 1);
    assert_eq!(alloc.grows.get(), 1);
    assert_eq!(arr[0], 0);
    assert!(arr[1..].iter().all(|item| *item == 7));
}

#[test]
fn array_growth_preserves_content() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<u64, &CountingAlloc>::new_in(&alloc);
    for idx in 0..1000 {
        arr.append(idx * 3);
    }
    // 10, 20, 40, ... 1280
    assert_eq!(alloc.allocs.get(), 1);
    assert_eq!(alloc.grows.get(), 7);
    assert_eq!(arr.capacity(), 1280);
    assert!(arr.iter().copied().eq((0..1000).map(|idx| idx * 3)));
}

#[test]
fn array_reset_reuses_buffer() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<usize, &CountingAlloc>::new_in(&alloc);
    arr.extend(0..15);
    let calls = alloc.calls();
    let capacity = arr.capacity();
    let ptr = arr.as_ptr();

    arr.reset();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), capacity);
    for idx in 0..15 {
        arr.append(idx);
    }
    assert_eq!(alloc.calls(), calls);
    assert_eq!(arr.as_ptr(), ptr);
}

#[test]
fn array_free_releases() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<usize, &CountingAlloc>::new_in(&alloc);
    arr.extend(0..25);
    arr.free();
    assert_eq!(alloc.allocs.get(), 1);
    assert_eq!(alloc.frees.get(), 1);

    let arr = DynArray::<usize, &CountingAlloc>::new_in(&alloc);
    drop(arr);
    assert_eq!(alloc.frees.get(), 1);
}

#[test]
fn array_drops_items() {
    let item = Rc::new(());
    let mut arr = DynArray::<Rc<()>>::new();
    arr.extend((0..5).map(|_| item.clone()));
    assert_eq!(Rc::strong_count(&item), 6);
    arr.reset();
    assert_eq!(Rc::strong_count(&item), 1);

    arr.append_many(&[item.clone(), item.clone()]);
    assert_eq!(Rc::strong_count(&item), 4);
    arr.free();
    assert_eq!(Rc::strong_count(&item), 1);

    let mut iter = dyn_array![item.clone(), item.clone(), item.clone()].into_iter();
    let first = iter.next();
    assert_eq!(Rc::strong_count(&item), 4);
    drop(iter);
    assert_eq!(Rc::strong_count(&item), 2);
    drop(first);
    assert_eq!(Rc::strong_count(&item), 1);
}

#[test]
fn array_iterate() {
    let mut arr = DynArray::<usize>::from(SLICE);
    let mut visited = Vec::new();
    for item in &arr {
        visited.push(*item);
    }
    assert_eq!(visited, SLICE);

    // iteration is restartable
    assert_eq!(arr.iter().count(), SLICE.len());

    for item in &mut arr {
        *item *= 2;
    }
    assert_eq!(arr, [2, 4, 6, 8, 10]);

    let mut iter = arr.into_iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next_back(), Some(10));
    assert_eq!(iter.as_slice(), &[2, 4, 6, 8]);
    assert_eq!(iter.collect::<Vec<_>>(), vec![2, 4, 6, 8]);

    let empty = DynArray::<usize>::new();
    assert_eq!(empty.iter().next(), None);
    assert_eq!(empty.into_iter().next(), None);
}

#[test]
fn array_remove_unordered() {
    let mut arr = dyn_array![10, 11, 12, 13];
    assert_eq!(arr.remove_unordered(1), 11);
    assert_eq!(arr, [10, 13, 12]);
    assert_eq!(arr.remove_unordered(2), 12);
    assert_eq!(arr, [10, 13]);
    assert_eq!(arr.remove_unordered(0), 10);
    assert_eq!(arr.remove_unordered(0), 13);
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 10);
}

#[test]
#[should_panic(expected = "Invalid element index")]
fn array_remove_unordered_empty() {
    let mut arr = DynArray::<usize>::new();
    arr.remove_unordered(0);
}

#[test]
fn array_last() {
    let mut arr = DynArray::<usize>::new();
    assert_eq!(arr.last(), None);
    assert_eq!(arr.last_mut(), None);
    assert_eq!(arr.pop(), None);
    arr.append_many(SLICE);
    assert_eq!(arr.last(), Some(&5));
    if let Some(last) = arr.last_mut() {
        *last = 50;
    }
    assert_eq!(arr, [1, 2, 3, 4, 50]);
    assert_eq!(arr.pop(), Some(50));
    assert_eq!(arr.last(), Some(&4));
}

#[test]
fn array_try_append_failure() {
    let mut arr = DynArray::<u32, LimitAlloc>::new_in(LimitAlloc { max_size: 40 });
    for idx in 0..10 {
        arr.try_append(idx).expect("append");
    }
    assert_eq!(arr.capacity(), 10);
    let err = arr.try_append(10).expect_err("expected failure");
    assert_eq!(
        err.error(),
        &StorageError::AllocError(Layout::array::<u32>(20).expect("layout"))
    );
    assert_eq!(err.into_value(), 10);
    assert_eq!(arr.len(), 10);
    assert_eq!(arr.capacity(), 10);
    assert!(arr.iter().copied().eq(0..10));
}

#[test]
fn array_try_append_many_failure() {
    let mut arr = DynArray::<u32, LimitAlloc>::new_in(LimitAlloc { max_size: 40 });
    arr.try_append_many(&[1, 2, 3]).expect("append");
    assert!(matches!(
        arr.try_append_many(&[4; 8]),
        Err(StorageError::AllocError(_))
    ));
    assert_eq!(arr, [1, 2, 3]);
    assert_eq!(arr.capacity(), 10);
    arr.try_append_many(&[4; 7]).expect("append");
    assert_eq!(arr.len(), 10);
}

#[test]
fn array_clone() {
    let alloc = CountingAlloc::default();
    let mut arr = DynArray::<usize, &CountingAlloc>::new_in(&alloc);
    arr.extend(SLICE);
    let mut copy = arr.clone();
    assert_eq!(copy, arr);
    assert_ne!(copy.as_ptr(), arr.as_ptr());
    assert_eq!(alloc.allocs.get(), 2);

    copy.append(6);
    assert_eq!(arr, SLICE);
    copy.clone_from(&arr);
    assert_eq!(copy, SLICE);
}

#[test]
fn array_macro() {
    let arr: DynArray<usize> = dyn_array![];
    assert_eq!(arr.capacity(), 0);
    let arr = dyn_array![1usize, 2, 3,];
    assert_eq!(arr, [1, 2, 3]);
    let arr = dyn_array![5u8; 12];
    assert_eq!(arr.len(), 12);
    assert_eq!(arr.capacity(), 20);

    let alloc = CountingAlloc::default();
    let arr = dyn_array![in &alloc; 1u16, 2];
    assert_eq!(arr, [1, 2]);
    let arr = dyn_array![in &alloc; 0u16; 3];
    assert_eq!(arr, [0, 0, 0]);
    let arr: DynArray<u16, &CountingAlloc> = dyn_array![in &alloc];
    assert!(arr.is_empty());
    assert_eq!(alloc.allocs.get(), 2);
}

#[test]
fn array_collect() {
    let arr: DynArray<usize> = (0..30).filter(|idx| idx % 3 == 0).collect();
    assert_eq!(arr, [0, 3, 6, 9, 12, 15, 18, 21, 24, 27]);
    assert_eq!(arr.capacity(), 10);
    assert_eq!(format!("{:?}", arr), format!("{:?}", &arr[..]));
}

#[test]
fn array_random_appends() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let count = rng.gen_range(0..500);
        let values: Vec<u64> = (0..count).map(|_| rng.gen()).collect();
        let mut arr = DynArray::<u64>::new();
        let mut flip = false;
        for chunk in values.chunks(7) {
            if flip {
                arr.append_many(chunk);
            } else {
                for item in chunk {
                    arr.append(*item);
                }
            }
            flip = !flip;
        }
        assert_eq!(arr.len(), count);
        assert!(arr.len() <= arr.capacity());
        assert_eq!(arr, values.as_slice());
    }
}
