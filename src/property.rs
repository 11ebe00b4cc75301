use std::{
    any::Any,
    cell::{Ref, RefCell, RefMut},
    marker::PhantomData,
    ops::{Deref, DerefMut, Index, IndexMut},
    rc::Rc,
};

use crate::{
    element::{EH, FH, HH, Handle, VH},
    error::Error,
    gc::Remap,
};

/// Named, type erased property columns of one element kind.
///
/// Every column always holds exactly [`Self::len`] values, one per element
/// slot, including the slots of deleted elements.
pub struct PropertyContainer<H>
where
    H: Handle,
{
    props: Vec<Box<dyn GenericProperty<H>>>,
    length: usize,
}

impl<H> Default for PropertyContainer<H>
where
    H: Handle,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PropertyContainer<H>
where
    H: Handle,
{
    pub fn new() -> Self {
        PropertyContainer {
            props: Vec::new(),
            length: 0,
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.props.iter().position(|p| p.name() == name)
    }

    /// Add a new column called `name`, with every existing element set to
    /// `default`.
    pub fn add<T>(&mut self, name: &str, default: T) -> Result<Property<H, T>, Error>
    where
        T: Clone + 'static,
    {
        if self.find(name).is_some() {
            log::debug!("Refusing to add duplicate {} property {:?}", H::KIND, name);
            return Err(Error::DuplicateName(H::KIND, name.to_string()));
        }
        let data = Rc::new(RefCell::new(Column {
            buf: PropBuf {
                buf: vec![default.clone(); self.length],
                _phantom: PhantomData,
            },
            detached: false,
        }));
        self.props.push(Box::new(StoredProperty {
            name: name.to_string(),
            default: default.clone(),
            data: Rc::clone(&data),
        }));
        log::trace!("Added {} property {:?}", H::KIND, name);
        Ok(Property { data, default })
    }

    /// Look up a column by name and value type. Returns `None` if there is no
    /// such column, or if it holds values of a different type.
    pub fn get<T>(&self, name: &str) -> Option<Property<H, T>>
    where
        T: Clone + 'static,
    {
        let stored = self.props[self.find(name)?]
            .as_any()
            .downcast_ref::<StoredProperty<H, T>>()?;
        Some(Property {
            data: Rc::clone(&stored.data),
            default: stored.default.clone(),
        })
    }

    /// Get the existing column called `name`, or add it if it doesn't
    /// exist. It is an error if the existing column holds a different type.
    pub fn get_or_add<T>(&mut self, name: &str, default: T) -> Result<Property<H, T>, Error>
    where
        T: Clone + 'static,
    {
        match self.find(name) {
            Some(_) => self
                .get(name)
                .ok_or_else(|| Error::DuplicateName(H::KIND, name.to_string())),
            None => self.add(name, default),
        }
    }

    /// Remove a column. Accessors that are still around become detached and
    /// report [`Error::PropertyRemoved`] when used. Returns `false` if there
    /// is no column with that name.
    pub fn remove(&mut self, name: &str) -> Result<bool, Error> {
        let Some(i) = self.find(name) else {
            return Ok(false);
        };
        self.props[i].detach()?;
        self.props.remove(i);
        log::trace!("Removed {} property {:?}", H::KIND, name);
        Ok(true)
    }

    /// Returns `false` if there is no column called `old`.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<bool, Error> {
        let Some(i) = self.find(old) else {
            return Ok(false);
        };
        if old != new && self.find(new).is_some() {
            return Err(Error::DuplicateName(H::KIND, new.to_string()));
        }
        self.props[i].set_name(new.to_string());
        log::trace!("Renamed {} property {:?} to {:?}", H::KIND, old, new);
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Names of all columns, in the order they were added.
    pub fn names(&self) -> Vec<String> {
        self.props.iter().map(|p| p.name().to_string()).collect()
    }

    /**
     * Reserve memory to accomodate an additional `n` elements.
     */
    pub fn reserve(&mut self, n: usize) -> Result<(), Error> {
        for prop in self.props.iter_mut() {
            prop.reserve(n)?;
        }
        Ok(())
    }

    /// Drop all values, keeping the columns.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.resize(0)
    }

    /// Grow or truncate every column to `n` values. New slots get the default
    /// value of their column.
    pub(crate) fn resize(&mut self, n: usize) -> Result<(), Error> {
        if n >= self.length {
            return self.push_values(n - self.length);
        }
        self.check_writable()?;
        for prop in self.props.iter_mut() {
            prop.truncate(n)?;
        }
        self.length = n;
        Ok(())
    }

    pub fn push_value(&mut self) -> Result<(), Error> {
        self.push_values(1)
    }

    /// Append `num` default values to every column. Either all columns grow,
    /// or none of them do.
    pub fn push_values(&mut self, num: usize) -> Result<(), Error> {
        let (count, err) = self
            .props
            .iter_mut()
            .fold((0usize, Ok(())), |(count, err), prop| match err {
                Ok(()) => match prop.push_many(num) {
                    Ok(()) => (count + 1, Ok(())),
                    Err(e) => (count, Err(e)),
                },
                Err(e) => (count, Err(e)),
            });
        // If something went wrong, go back to how things were.
        if err.is_err() {
            for prop in self.props.iter_mut().take(count) {
                prop.truncate(self.length)?;
            }
            return err;
        }
        self.length += num;
        Ok(())
    }

    pub fn copy(&mut self, src: H, dst: H) -> Result<(), Error> {
        for prop in self.props.iter_mut() {
            prop.copy(src.index() as usize, dst.index() as usize)?;
        }
        Ok(())
    }

    pub fn copy_many(&mut self, src: &[H], dst: &[H]) -> Result<(), Error> {
        if src.len() != dst.len() {
            return Err(Error::MismatchedArrayLengths(src.len(), dst.len()));
        }
        for prop in self.props.iter_mut() {
            prop.copy_many(src, dst)?;
        }
        Ok(())
    }

    /// Drop the values of every slot whose `keep` flag is false, preserving
    /// the relative order of the rest.
    pub fn retain(&mut self, keep: &[bool]) -> Result<(), Error> {
        if keep.len() != self.length {
            return Err(Error::MismatchedArrayLengths(keep.len(), self.length));
        }
        for prop in self.props.iter_mut() {
            prop.retain(keep)?;
        }
        self.length = keep.iter().filter(|k| **k).count();
        Ok(())
    }

    /// Rewrite the handles stored in handle valued columns.
    pub fn remap_handles(&mut self, remap: &Remap) -> Result<(), Error> {
        for prop in self.props.iter_mut() {
            prop.remap_handles(remap)?;
        }
        Ok(())
    }

    /// Fails with [`Error::BorrowedPropertyAccess`] if any column is currently
    /// borrowed, and so cannot be resized.
    pub fn check_writable(&self) -> Result<(), Error> {
        if self.props.iter().all(|p| p.is_writable()) {
            Ok(())
        } else {
            Err(Error::BorrowedPropertyAccess)
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn num_properties(&self) -> usize {
        self.props.len()
    }
}

trait GenericProperty<H>
where
    H: Handle,
{
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    fn reserve(&mut self, n: usize) -> Result<(), Error>;

    fn truncate(&mut self, n: usize) -> Result<(), Error>;

    fn push_many(&mut self, num: usize) -> Result<(), Error>;

    fn copy(&mut self, src: usize, dst: usize) -> Result<(), Error>;

    fn copy_many(&mut self, src: &[H], dst: &[H]) -> Result<(), Error>;

    fn retain(&mut self, keep: &[bool]) -> Result<(), Error>;

    fn remap_handles(&mut self, remap: &Remap) -> Result<(), Error>;

    fn detach(&mut self) -> Result<(), Error>;

    fn is_writable(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// Buffer containing the property values.
///
/// This is meant to be a thin wrapper around `T` that allows for convenient and
/// type safe indexing with the handle type `H`. If you need a raw slice, you
/// can always convert the property buffer into a `&[T]` at zero cost.
///
/// To access this buffer from the property that owns it, you have it borrow it
/// as either [`Ref`](std::cell::Ref) or [`RefMut`](std::cell::RefMut)
pub struct PropBuf<H, T>
where
    H: Handle,
{
    pub(crate) buf: Vec<T>,
    _phantom: PhantomData<H>,
}

/// The element handle can be used to index into the property buffer.
impl<H, T> Index<H> for PropBuf<H, T>
where
    H: Handle,
{
    type Output = T;

    fn index(&self, handle: H) -> &Self::Output {
        &self.buf[handle.index() as usize]
    }
}

/// The element handle can be used to index into the property buffer.
impl<H, T> IndexMut<H> for PropBuf<H, T>
where
    H: Handle,
{
    fn index_mut(&mut self, h: H) -> &mut Self::Output {
        &mut self.buf[h.index() as usize]
    }
}

/// A property buffer can be turned into a `&[T]` for conveninence.
impl<H, T> Deref for PropBuf<H, T>
where
    H: Handle,
{
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<H, T> DerefMut for PropBuf<H, T>
where
    H: Handle,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

/// Storage shared between the container and the accessors. Removing the
/// property from the mesh frees the values and marks the column detached.
struct Column<H, T>
where
    H: Handle,
{
    buf: PropBuf<H, T>,
    detached: bool,
}

/// This represents a property defined on the elements of the mesh. `T` is the
/// type of data associated with each element of the mesh, whose handle type is
/// `H`.
///
/// The mesh keeps every property synchronized with its elements: adding
/// elements appends default values, and garbage collection compacts the
/// values in the same way as the elements. An accessor is a cheap handle to
/// the values owned by the mesh. Once the property is removed from the mesh,
/// every access through the accessor fails with [`Error::PropertyRemoved`].
#[derive(Clone)]
pub struct Property<H, T>
where
    H: Handle,
{
    data: Rc<RefCell<Column<H, T>>>,
    default: T,
}

impl<H, T> Property<H, T>
where
    H: Handle,
    T: Clone + 'static,
{
    /// The value given to new elements.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Check if the property is still part of the mesh.
    pub fn is_attached(&self) -> bool {
        self.data.try_borrow().map(|c| !c.detached).unwrap_or(true)
    }

    /// Try to borrow the property with read-only access.
    ///
    /// Properties use interior mutability pattern using a [`RefCell<T>`] to
    /// enforce runtime borrow checking rules. If borrowing fails,
    /// [`Error::BorrowedPropertyAccess`] is returned, otherwise a reference to
    /// the property is returned.
    pub fn try_borrow(&self) -> Result<Ref<'_, PropBuf<H, T>>, Error> {
        let col = self
            .data
            .try_borrow()
            .map_err(|_| Error::BorrowedPropertyAccess)?;
        if col.detached {
            return Err(Error::PropertyRemoved);
        }
        Ok(Ref::map(col, |c| &c.buf))
    }

    /// Try to borrow the property with mutable access.
    ///
    /// The values can be modified, but not resized.
    pub fn try_borrow_mut(&mut self) -> Result<RefMut<'_, PropBuf<H, T>>, Error> {
        let col = self
            .data
            .try_borrow_mut()
            .map_err(|_| Error::BorrowedPropertyAccess)?;
        if col.detached {
            return Err(Error::PropertyRemoved);
        }
        Ok(RefMut::map(col, |c| &mut c.buf))
    }

    /// Get a reference to the property value of the mesh element `h`.
    pub fn get(&self, h: H) -> Result<Ref<'_, T>, Error> {
        let buf = self.try_borrow()?;
        let i = h.index() as usize;
        if i >= buf.len() {
            return Err(Error::OutOfBoundsAccess(i));
        }
        Ok(Ref::map(buf, |b| &b.buf[i]))
    }

    /// Get the cloned property value of the mesh element `h`.
    pub fn get_cloned(&self, h: H) -> Result<T, Error> {
        Ok(self.get(h)?.clone())
    }

    /// Get a mutable reference to the property value of a mesh element.
    pub fn get_mut(&mut self, h: H) -> Result<RefMut<'_, T>, Error> {
        let buf = self.try_borrow_mut()?;
        let i = h.index() as usize;
        if i >= buf.len() {
            return Err(Error::OutOfBoundsAccess(i));
        }
        Ok(RefMut::map(buf, |b| &mut b.buf[i]))
    }

    /// Set the property value of a mesh element.
    pub fn set(&mut self, h: H, val: T) -> Result<(), Error> {
        (*self.get_mut(h)?) = val;
        Ok(())
    }

    /// Set every value to `val`.
    pub fn fill(&mut self, val: T) -> Result<(), Error> {
        self.try_borrow_mut()?.fill(val);
        Ok(())
    }
}

/// Vertex property. A value of type `T` is defined on each vertex of the
/// mesh.
///
/// See the documentation of [`Property<H, T>`] for more context on how
/// properties work.
///
/// ```rust
/// use surfmesh::use_glam::PolyMeshF32;
///
/// let mut mesh = PolyMeshF32::tetrahedron(1.0).expect("Cannot create a tetrahedron");
/// // Create a vertex property of type u32, with a default value of 42.
/// let vprop = mesh
///     .add_vertex_property("v:answer", 42u32)
///     .expect("Cannot add property");
/// let v = 2.into(); // Vertex indexed 2.
/// assert_eq!(42, vprop.get_cloned(v).expect("Cannot read vertex property"));
/// ```
pub type VProperty<T> = Property<VH, T>;

/// Halfedge property. A value of type `T` is defined on each halfedge of the
/// mesh.
pub type HProperty<T> = Property<HH, T>;

/// Edge property. A value of type `T` is defined on each edge of the
/// mesh.
pub type EProperty<T> = Property<EH, T>;

/// Face property. A value of type `T` is defined on each face of the
/// mesh.
pub type FProperty<T> = Property<FH, T>;

/// Buffer containing the values of a vertex property.
pub type VPropBuf<T> = PropBuf<VH, T>;

/// Buffer containing the values of a halfedge property.
pub type HPropBuf<T> = PropBuf<HH, T>;

/// Buffer containing the values of an edge property.
pub type EPropBuf<T> = PropBuf<EH, T>;

/// Buffer containing the values of a face property.
pub type FPropBuf<T> = PropBuf<FH, T>;

/// This is what lives inside the property container. It owns the name and
/// knows the concrete value type, so it can resize and compact the values
/// whenever topological edits are made to the mesh.
struct StoredProperty<H, T>
where
    H: Handle,
{
    name: String,
    default: T,
    data: Rc<RefCell<Column<H, T>>>,
}

impl<H, T> StoredProperty<H, T>
where
    H: Handle,
    T: Clone + 'static,
{
    fn values_mut(&self) -> Result<RefMut<'_, Vec<T>>, Error> {
        let col = self
            .data
            .try_borrow_mut()
            .map_err(|_| Error::BorrowedPropertyAccess)?;
        Ok(RefMut::map(col, |c| &mut c.buf.buf))
    }
}

impl<H, T> GenericProperty<H> for StoredProperty<H, T>
where
    H: Handle,
    T: Clone + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /**
     * Reserve memory for an additional `n` values.
     */
    fn reserve(&mut self, n: usize) -> Result<(), Error> {
        self.values_mut()?.reserve(n);
        Ok(())
    }

    fn truncate(&mut self, n: usize) -> Result<(), Error> {
        self.values_mut()?.truncate(n);
        Ok(())
    }

    fn push_many(&mut self, num: usize) -> Result<(), Error> {
        let mut values = self.values_mut()?;
        let len = values.len();
        values.resize(len + num, self.default.clone());
        Ok(())
    }

    fn copy(&mut self, src: usize, dst: usize) -> Result<(), Error> {
        let mut values = self.values_mut()?;
        let len = values.len();
        if src >= len || dst >= len {
            return Err(Error::OutOfBoundsAccess(src.max(dst)));
        }
        values[dst] = values[src].clone();
        Ok(())
    }

    fn copy_many(&mut self, src: &[H], dst: &[H]) -> Result<(), Error> {
        let mut values = self.values_mut()?;
        for (src, dst) in src
            .iter()
            .map(|h| h.index() as usize)
            .zip(dst.iter().map(|h| h.index() as usize))
        {
            if src >= values.len() || dst >= values.len() {
                return Err(Error::OutOfBoundsAccess(src.max(dst)));
            }
            values[dst] = values[src].clone();
        }
        Ok(())
    }

    fn retain(&mut self, keep: &[bool]) -> Result<(), Error> {
        let mut values = self.values_mut()?;
        let mut flags = keep.iter();
        values.retain(|_| flags.next().copied().unwrap_or(false));
        values.shrink_to_fit();
        Ok(())
    }

    fn remap_handles(&mut self, remap: &Remap) -> Result<(), Error> {
        let mut values = self.values_mut()?;
        remap.translate(&mut *values as &mut dyn Any);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Error> {
        let mut col = self
            .data
            .try_borrow_mut()
            .map_err(|_| Error::BorrowedPropertyAccess)?;
        col.detached = true;
        col.buf.buf = Vec::new();
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.data.try_borrow_mut().is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
