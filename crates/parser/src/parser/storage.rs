//! Small-object storage for a type-erased event handler.
//!
//! Handlers that fit into [`INLINE_CAPACITY`] bytes with at most pointer alignment live inside
//! the parser itself, bigger ones are boxed. Either way the handler is reached through a
//! `&mut dyn Events`, so the storage choice never changes behaviour.

use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

use crate::parser::Events;
use crate::parser::variants::MessageImpl;
use crate::protocol::body::VecBody;
use crate::protocol::{FieldList, Request};

/// Inline budget: a request message handler with a `Vec<u8>` body plus four pointer-words.
pub const INLINE_CAPACITY: usize =
    size_of::<MessageImpl<'static, Request, VecBody, FieldList>>() + 4 * size_of::<usize>();

const INLINE_WORDS: usize = INLINE_CAPACITY.div_ceil(size_of::<usize>());

/// A handler stored in place, with the type-specific operations captured at construction.
pub(crate) struct Inline<'a> {
    buf: MaybeUninit<[usize; INLINE_WORDS]>,
    as_events: fn(*mut u8) -> *mut (dyn Events + 'a),
    drop_value: unsafe fn(*mut u8),
    // the stored handler is not required to be Send or Sync
    _not_send: PhantomData<*mut ()>,
}

fn as_events<'a, T: Events + 'a>(ptr: *mut u8) -> *mut (dyn Events + 'a) {
    ptr.cast::<T>() as *mut (dyn Events + 'a)
}

unsafe fn drop_value<T>(ptr: *mut u8) {
    // SAFETY: the caller guarantees `ptr` points to a live `T` that is not used afterwards.
    unsafe { ptr.cast::<T>().drop_in_place() }
}

impl<'a> Inline<'a> {
    pub(crate) fn fits<T>() -> bool {
        size_of::<T>() <= size_of::<[usize; INLINE_WORDS]>() && align_of::<T>() <= align_of::<usize>()
    }

    /// Stores `value` in place, or hands it back if it does not fit.
    pub(crate) fn try_new<T: Events + 'a>(value: T) -> Result<Self, T> {
        if !Self::fits::<T>() {
            return Err(value);
        }

        let mut buf = MaybeUninit::<[usize; INLINE_WORDS]>::uninit();
        // SAFETY: `fits` checked that `T` is no larger than the buffer and needs no stricter
        // alignment than `usize`, which is the alignment of the buffer.
        unsafe { buf.as_mut_ptr().cast::<T>().write(value) };

        Ok(Self { buf, as_events: as_events::<T>, drop_value: drop_value::<T>, _not_send: PhantomData })
    }

    pub(crate) fn get_mut(&mut self) -> &mut (dyn Events + 'a) {
        let ptr = (self.as_events)(self.buf.as_mut_ptr().cast());
        // SAFETY: `buf` holds the live value written in `try_new` and `as_events` was
        // instantiated for its type. The value is not self-referential, so moving `Inline`
        // moved it along without invalidating it.
        unsafe { &mut *ptr }
    }
}

impl Drop for Inline<'_> {
    fn drop(&mut self) {
        // SAFETY: the value written in `try_new` is still live and is dropped exactly once here.
        unsafe { (self.drop_value)(self.buf.as_mut_ptr().cast()) }
    }
}

impl fmt::Debug for Inline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inline").field("capacity", &INLINE_CAPACITY).finish_non_exhaustive()
    }
}

pub(crate) enum Storage<'a> {
    Inline(Inline<'a>),
    Heap(Box<dyn Events + 'a>),
}

impl<'a> Storage<'a> {
    pub(crate) fn new<T: Events + 'a>(value: T) -> Self {
        match Inline::try_new(value) {
            Ok(inline) => Storage::Inline(inline),
            Err(value) => Storage::Heap(Box::new(value)),
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut (dyn Events + 'a) {
        match self {
            Storage::Inline(inline) => inline.get_mut(),
            Storage::Heap(boxed) => boxed.as_mut(),
        }
    }

    pub(crate) fn is_inline(&self) -> bool {
        matches!(self, Storage::Inline(_))
    }
}

impl fmt::Debug for Storage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Inline(inline) => f.debug_tuple("Inline").field(inline).finish(),
            Storage::Heap(_) => f.write_str("Heap"),
        }
    }
}
