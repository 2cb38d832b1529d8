//! Drag-and-drop reordering of staged pages
//!
//! Pointer drags and touch drags both end in [`move_item`]; the gesture
//! handlers only work out which index is being dropped on.

/// Move the element at `source` to `destination`, shifting the elements in
/// between by one. Elements outside that range keep their position.
///
/// Returns `false` (leaving `items` untouched) when the indices are equal or
/// either is out of range.
pub fn move_item<T>(items: &mut [T], source: usize, destination: usize) -> bool {
    let len = items.len();
    if source == destination || source >= len || destination >= len {
        return false;
    }

    if source < destination {
        items[source..=destination].rotate_left(1);
    } else {
        items[destination..=source].rotate_right(1);
    }
    true
}

/// A point in the coordinate space of the rendered page grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Resolves which rendered element, if any, sits under a point
pub trait HitTest {
    fn index_at(&self, point: Point) -> Option<usize>;
}

/// Hit-testing for a grid of equally sized cells laid out row by row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Spacing between cells, both horizontally and vertically
    pub gap: f64,
    /// Number of rendered cells
    pub count: usize,
}

impl HitTest for GridLayout {
    fn index_at(&self, point: Point) -> Option<usize> {
        if self.columns == 0
            || !point.x.is_finite()
            || !point.y.is_finite()
            || point.x < 0.0
            || point.y < 0.0
        {
            return None;
        }

        let pitch_x = self.cell_width + self.gap;
        let pitch_y = self.cell_height + self.gap;
        let col = (point.x / pitch_x).floor() as usize;
        let row = (point.y / pitch_y).floor() as usize;

        // Points in the gutter between cells hit nothing
        if point.x - col as f64 * pitch_x >= self.cell_width
            || point.y - row as f64 * pitch_y >= self.cell_height
            || col >= self.columns
        {
            return None;
        }

        let index = row.checked_mul(self.columns)?.checked_add(col)?;
        (index < self.count).then_some(index)
    }
}

/// Tracks the single drag in progress
///
/// No state survives a gesture: every drop or cancel clears the source.
#[derive(Debug, Default, Clone)]
pub struct ReorderEngine {
    source: Option<usize>,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging the element at `source`, replacing any stale drag
    pub fn begin_drag(&mut self, source: usize) {
        self.source = Some(source);
    }

    /// Index of the element being dragged, if any
    pub fn dragging(&self) -> Option<usize> {
        self.source
    }

    /// Drop the dragged element at `target` (pointer path)
    ///
    /// Returns whether the sequence changed.
    pub fn drop_at<T>(&mut self, items: &mut [T], target: usize) -> bool {
        match self.source.take() {
            Some(source) => {
                let moved = move_item(items, source, target);
                if moved {
                    tracing::debug!(source, target, "Moved page");
                }
                moved
            }
            None => false,
        }
    }

    /// Drop the dragged element wherever `point` lands (touch path)
    ///
    /// If no element is rendered under the point the drag is cancelled.
    pub fn drop_at_point<T, H: HitTest + ?Sized>(
        &mut self,
        items: &mut [T],
        point: Point,
        layout: &H,
    ) -> bool {
        match layout.index_at(point) {
            Some(target) => self.drop_at(items, target),
            None => {
                self.cancel();
                false
            }
        }
    }

    /// Abandon the current drag
    pub fn cancel(&mut self) {
        self.source = None;
    }
}
