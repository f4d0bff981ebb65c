//! Naming metadata shared by every persisted resource.

/// Names a resource type for envelope keys and human-readable messages.
pub trait ResourceKind {
    /// Singular name used in messages ("delivery address")
    const NAME: &'static str;
    /// Plural name used in messages ("delivery addresses")
    const PLURAL: &'static str;
    /// Capitalised singular name ("Delivery address")
    const TITLE: &'static str;
    /// Envelope key the resource is serialized under ("delivery_address")
    const KEY: &'static str;

    /// "1 customer" / "3 customers"
    fn count_label(count: u64) -> String {
        if count == 1 {
            format!("1 {}", Self::NAME)
        } else {
            format!("{} {}", count, Self::PLURAL)
        }
    }
}

/// Implements [`ResourceKind`] for a type.
#[macro_export]
macro_rules! resource_kind {
    ($ty:ty, $name:literal, $plural:literal, $title:literal, $key:literal) => {
        impl $crate::resource::ResourceKind for $ty {
            const NAME: &'static str = $name;
            const PLURAL: &'static str = $plural;
            const TITLE: &'static str = $title;
            const KEY: &'static str = $key;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;
    resource_kind!(Widget, "widget", "widgets", "Widget", "widget");

    #[test]
    fn count_label_pluralizes() {
        assert_eq!(Widget::count_label(1), "1 widget");
        assert_eq!(Widget::count_label(0), "0 widgets");
        assert_eq!(Widget::count_label(3), "3 widgets");
    }
}
