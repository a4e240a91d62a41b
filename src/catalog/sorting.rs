use crate::models::SortOrder;

/// Orderings computed from a floor-plan range aggregated per apartment.
///
/// Cheapest and smallest take the MIN of each plan's lower bound and sort
/// ascending. Most expensive and largest take the MAX of each plan's upper
/// bound and sort descending. Apartments without a derived value go last,
/// and ties keep id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedSort {
    Cheapest,
    MostExpensive,
    Smallest,
    Largest,
}

impl DerivedSort {
    pub fn from_sort_order(order: SortOrder) -> Option<Self> {
        match order {
            SortOrder::Cheapest => Some(DerivedSort::Cheapest),
            SortOrder::MostExpensive => Some(DerivedSort::MostExpensive),
            SortOrder::Smallest => Some(DerivedSort::Smallest),
            SortOrder::Largest => Some(DerivedSort::Largest),
            SortOrder::AToZ | SortOrder::ZToA | SortOrder::None => None,
        }
    }

    /// Pre-parsed floorplans column the ordering reads
    fn column(&self) -> &'static str {
        match self {
            DerivedSort::Cheapest => "rent_min",
            DerivedSort::MostExpensive => "rent_max",
            DerivedSort::Smallest => "size_min",
            DerivedSort::Largest => "size_max",
        }
    }

    fn aggregate(&self) -> &'static str {
        match self {
            DerivedSort::Cheapest | DerivedSort::Smallest => "MIN",
            DerivedSort::MostExpensive | DerivedSort::Largest => "MAX",
        }
    }

    fn direction(&self) -> &'static str {
        match self {
            DerivedSort::Cheapest | DerivedSort::Smallest => "ASC",
            DerivedSort::MostExpensive | DerivedSort::Largest => "DESC",
        }
    }

    /// Query returning apartment rows in this order.
    ///
    /// The LEFT JOIN keeps apartments without floor plans; SQL aggregates skip
    /// NULL columns, so unparsed ranges never contribute a value.
    pub fn sql(&self) -> String {
        format!(
            "SELECT a.id, a.name, a.address, a.coordinates, a.utilities, \
                    {agg}(f.{col}) AS sort_key \
             FROM apartments a \
             LEFT JOIN floorplans f ON a.id = f.apartment_id \
             GROUP BY a.id \
             ORDER BY sort_key IS NULL, sort_key {dir}, a.id ASC",
            agg = self.aggregate(),
            col = self.column(),
            dir = self.direction(),
        )
    }
}
