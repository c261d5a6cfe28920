use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::Node;

/// An in-order iterator over the nodes of an [`AvlTree`].
///
/// [`AvlTree`]: crate::AvlTree
pub struct Iter<'tree, K> {
    // Nodes whose left subtree has been exhausted but which have not been yielded yet. The top of
    // the stack is always the next node in order.
    stack: Vec<&'tree Node<K>>,
    len: usize,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(root: Option<&'tree Node<K>>, len: usize) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            len,
        };
        iter.descend(root);
        iter
    }

    // Upon entering a new subtree, push the path to its minimum element.
    fn descend(&mut self, mut opt_cur: Option<&'tree Node<K>>) {
        while let Some(cur) = opt_cur {
            self.stack.push(cur);
            opt_cur = cur.left();
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree Node<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        // The successor is the minimum of the right subtree, or else the nearest ancestor still
        // on the stack.
        self.descend(cur.right());
        self.len -= 1;

        Some(cur)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
