/// 來源 × 目的地的惰性笛卡兒積，來源為主序、目的地為次序
pub struct CrossProduct<'d, I: Iterator, D> {
    sources: I,
    destinations: &'d [D],
    current: Option<I::Item>,
    index: usize,
}

impl<'d, I, D> CrossProduct<'d, I, D>
where
    I: Iterator,
    I::Item: Clone,
{
    pub fn new(sources: impl IntoIterator<IntoIter = I>, destinations: &'d [D]) -> Self {
        let mut sources = sources.into_iter();
        let current = if destinations.is_empty() {
            None
        } else {
            sources.next()
        };
        Self {
            sources,
            destinations,
            current,
            index: 0,
        }
    }
}

impl<'d, I, D> Iterator for CrossProduct<'d, I, D>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, &'d D);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let source = self.current.as_ref()?;
            if let Some(destination) = self.destinations.get(self.index) {
                self.index += 1;
                return Some((source.clone(), destination));
            }
            self.current = self.sources.next();
            self.index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let width = self.destinations.len();
        let in_progress = match self.current {
            Some(_) => width - self.index,
            None => return (0, Some(0)),
        };
        let (lower, upper) = self.sources.size_hint();
        (
            lower.saturating_mul(width).saturating_add(in_progress),
            upper
                .and_then(|u| u.checked_mul(width))
                .and_then(|u| u.checked_add(in_progress)),
        )
    }
}
