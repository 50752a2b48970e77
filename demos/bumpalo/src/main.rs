use bumpalo::Bump;
use dyn_array::{dyn_array, DynArray};

fn main() {
    let bump = Bump::new();
    let mut arr: DynArray<u32, &Bump> = DynArray::new_in(&bump);
    arr.append(83u32);
    assert_eq!(arr, &[83]);
    assert_eq!(arr.capacity(), 10);

    arr.append_many(&[1, 2, 3]);
    arr.extend(0..10000);
    assert_eq!(arr.len(), 10004);
    assert_eq!(arr.last(), Some(&9999));

    arr.reset();
    assert!(arr.is_empty());
    arr.free();

    let copied = dyn_array![in &bump; 7u8; 3];
    assert_eq!(copied, [7, 7, 7]);
    println!("allocated {} bytes from the arena", bump.allocated_bytes());
}
