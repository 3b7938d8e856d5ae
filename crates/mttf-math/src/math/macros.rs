/// Implements a binary operator for every owned/borrowed operand combination
/// in terms of a single `fn(&T, &T) -> T`.
macro_rules! forward_binop {
    ($ty:ty, $trait:ident, $method:ident, $imp:path) => {
        impl std::ops::$trait<&$ty> for &$ty {
            type Output = $ty;
            fn $method(self, rhs: &$ty) -> $ty {
                $imp(self, rhs)
            }
        }

        impl std::ops::$trait<$ty> for $ty {
            type Output = $ty;
            fn $method(self, rhs: $ty) -> $ty {
                $imp(&self, &rhs)
            }
        }

        impl std::ops::$trait<&$ty> for $ty {
            type Output = $ty;
            fn $method(self, rhs: &$ty) -> $ty {
                $imp(&self, rhs)
            }
        }

        impl std::ops::$trait<$ty> for &$ty {
            type Output = $ty;
            fn $method(self, rhs: $ty) -> $ty {
                $imp(self, &rhs)
            }
        }
    };
}

/// Implements `op=` in terms of the by-reference binary operator.
macro_rules! forward_assign_op {
    ($ty:ty, $trait:ident, $method:ident, $imp:path) => {
        impl std::ops::$trait<&$ty> for $ty {
            fn $method(&mut self, rhs: &$ty) {
                *self = $imp(self, rhs);
            }
        }

        impl std::ops::$trait<$ty> for $ty {
            fn $method(&mut self, rhs: $ty) {
                *self = $imp(self, &rhs);
            }
        }
    };
}
