pub trait VecExtensions<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool;
}

impl<T> VecExtensions<T> for Vec<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter()
            .position(predicate)
            .map(|index| self.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::VecExtensions;

    #[test]
    fn remove_first_where_should_remove_only_the_first_match() {
        let mut v = vec![1, 2, 2, 3];
        assert_eq!(v.remove_first_where(|&x| x == 2), Some(2));
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn remove_first_where_should_return_none_without_match() {
        let mut v = vec![1, 2, 3];
        assert_eq!(v.remove_first_where(|&x| x == 9), None);
        assert_eq!(v, vec![1, 2, 3]);
    }
}
