/// Swapper is a wrapper for two things of the same type, one playing the "read"
/// role and the other the "write" role. It's meant for passes that iterate over
/// one collection and write their results to the second. Swapping flips the
/// roles without moving or copying either value.
pub struct Swapper<T> {
    a: T,
    b: T,
    read_is_a: bool,
}

impl<T> Swapper<T> {
    /// `a` starts out in the read role.
    pub fn new(a: T, b: T) -> Self {
        Self {
            a,
            b,
            read_is_a: true,
        }
    }

    pub fn swap(&mut self) {
        self.read_is_a = !self.read_is_a
    }

    pub fn read(&self) -> &T {
        if self.read_is_a {
            &self.a
        } else {
            &self.b
        }
    }

    pub fn write(&self) -> &T {
        if self.read_is_a {
            &self.b
        } else {
            &self.a
        }
    }

    pub fn read_mut(&mut self) -> &mut T {
        if self.read_is_a {
            &mut self.a
        } else {
            &mut self.b
        }
    }

    pub fn write_mut(&mut self) -> &mut T {
        if self.read_is_a {
            &mut self.b
        } else {
            &mut self.a
        }
    }

    /// Borrow both sides at once. The two references never point at the same value.
    pub fn read_and_write(&mut self) -> (&T, &mut T) {
        if self.read_is_a {
            (&self.a, &mut self.b)
        } else {
            (&self.b, &mut self.a)
        }
    }
}
