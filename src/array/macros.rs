/// Create a [`DynArray`](crate::array::DynArray) containing the arguments.
///
/// ```
/// use dyn_array::{dyn_array, DynArray};
///
/// let arr = dyn_array![1, 2, 3];
/// assert_eq!(arr, [1, 2, 3]);
///
/// let zeros = dyn_array![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
///
/// let empty: DynArray<u8> = dyn_array![];
/// assert_eq!(empty.capacity(), 0);
/// ```
#[macro_export]
macro_rules! dyn_array {
    (in $alloc:expr $(;)?) => (
        $crate::array::from_array_in([], $alloc)
    );
    (in $alloc:expr; $elem:expr; $n:expr) => (
        $crate::array::from_elem_in($elem, $n, $alloc)
    );
    (in $alloc:expr; $($x:expr),+ $(,)?) => (
        $crate::array::from_array_in([$($x),+], $alloc)
    );
    () => (
        $crate::array::DynArray::new()
    );
    ($elem:expr; $n:expr) => (
        $crate::array::from_elem($elem, $n)
    );
    ($($x:expr),+ $(,)?) => (
        $crate::array::from_array([$($x),+])
    );
}
