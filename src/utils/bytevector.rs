/// A growable byte buffer whose capacity doubles when it runs out of room.
///
/// Every decompressor writes its output through one of these.
#[derive(Debug, Default, Clone)]
pub struct ByteVector {
    data: Vec<u8>,
}

impl ByteVector {
    pub fn with_capacity(capacity: usize) -> Self {
        ByteVector {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Appends `count` copies of `value`.
    pub fn add_repeated(&mut self, value: u8, count: usize) {
        self.ensure_room(count);
        self.data.resize(self.data.len() + count, value);
    }

    /// Appends a slice of bytes.
    pub fn add_slice(&mut self, values: &[u8]) {
        self.ensure_room(values.len());
        self.data.extend_from_slice(values);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    fn ensure_room(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed <= self.data.capacity() {
            return;
        }

        let mut capacity = self.data.capacity().max(1);
        while capacity < needed {
            capacity = capacity * 2 + 1;
        }

        self.data.reserve_exact(capacity - self.data.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_past_capacity() {
        let mut buffer = ByteVector::with_capacity(4);
        buffer.add_slice(&[1, 2, 3, 4]);
        buffer.add_slice(&[5]);

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.into_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_repeated_runs() {
        let mut buffer = ByteVector::with_capacity(0);
        assert!(buffer.is_empty());

        buffer.add_repeated(0xAA, 25);
        buffer.add_repeated(0x01, 2);

        let bytes = buffer.into_vec();
        assert_eq!(bytes.len(), 27);
        assert!(bytes[..25].iter().all(|&b| b == 0xAA));
        assert_eq!(&bytes[25..], &[1, 1]);
    }
}
