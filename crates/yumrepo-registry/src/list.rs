//! Eagerly extracted, lazily parsed record lists.

use std::{io::Read, slice};

use tracing::debug;

use crate::{
    cache::CacheStore,
    changelog::ChangelogRecord,
    compression::decompress,
    error::Result,
    extract::{RecordFragment, StreamingRecordExtractor},
    location::RepositoryLocation,
    manifest::ManifestResolver,
    package::PackageRecord,
};

/// A record type backed by one manifest role.
pub trait Record: Sized {
    /// Manifest role of the document holding these records.
    const ROLE: &'static str;

    /// Element name of a single record.
    const TAG: &'static str = "package";

    fn from_fragment(fragment: RecordFragment) -> Self;
}

/// Every record of one role, in document order.
///
/// Building the list decompresses the document and splits it into fragments in
/// one pass; individual records are only parsed when their fields are read.
#[derive(Debug)]
pub struct RecordList<R> {
    location: RepositoryLocation,
    records: Vec<R>,
}

pub type PackageList = RecordList<PackageRecord>;
pub type PackageChangelogList = RecordList<ChangelogRecord>;

impl<R: Record> RecordList<R> {
    /// Fetches the manifest of `location` and reads the document for `R::ROLE`.
    pub fn new(location: RepositoryLocation, cache: CacheStore) -> Result<Self> {
        let mut resolver = ManifestResolver::new(location, cache)?;
        Self::from_resolver(&mut resolver)
    }

    /// Normalizes `url` and reads the list, see [`RecordList::new`].
    pub fn from_url(url: &str, cache: CacheStore) -> Result<Self> {
        Self::new(RepositoryLocation::new(url)?, cache)
    }

    /// Reads the list through an existing resolver.
    ///
    /// The role's document is closed afterwards whether or not reading
    /// succeeded.
    pub fn from_resolver(resolver: &mut ManifestResolver) -> Result<Self> {
        let records = resolver
            .resolved_document(R::ROLE)
            .and_then(|stream| Self::read_records(stream));
        resolver.close(R::ROLE);

        let records = records?;
        debug!(
            "Read {} {} records from {}",
            records.len(),
            R::ROLE,
            resolver.location()
        );

        Ok(Self {
            location: resolver.location().clone(),
            records,
        })
    }

    /// Decompresses `reader` and wraps every `R::TAG` element.
    pub fn read_records<Rd: Read>(reader: Rd) -> Result<Vec<R>> {
        let document = format!("{}.xml.gz", R::ROLE);
        let bytes = decompress(reader, &document)?;

        StreamingRecordExtractor::new(&bytes, R::TAG)
            .with_document(document)
            .map(|fragment| fragment.map(R::from_fragment))
            .collect()
    }
}

impl<R> RecordList<R> {
    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn all(&self) -> &[R] {
        &self.records
    }

    /// Calls `visit` with every record in order.
    pub fn each<F: FnMut(&R)>(&self, visit: F) {
        self.records.iter().for_each(visit);
    }

    pub fn iter(&self) -> slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<'a, R> IntoIterator for &'a RecordList<R> {
    type Item = &'a R;
    type IntoIter = slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R> IntoIterator for RecordList<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use filetime::FileTime;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        error::RegistryError,
        test_utils::{cache_store, gzip, MockFetcher, OTHER_HREF, PRIMARY_HREF, REPO_URL},
    };

    fn names(list: &PackageList) -> Vec<String> {
        list.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn test_package_list() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::repository());
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);

        let list = PackageList::from_url(REPO_URL, cache).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(names(&list), vec!["readline", "zlib", "bash"]);

        let first = &list.all()[0];
        assert_eq!(first.version(), "6.0");
        assert_eq!(first.release(), "3.el6");
        assert_eq!(first.license(), "GPLv3+");

        let mut visited = 0;
        list.each(|_| visited += 1);
        assert_eq!(visited, 3);
        assert_eq!((&list).into_iter().count(), 3);
    }

    #[test]
    fn test_changelog_list() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::repository());
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);

        let list = PackageChangelogList::from_url(&format!("{REPO_URL}/repodata/"), cache).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.location().as_str(), REPO_URL);

        let readline = &list.all()[0];
        assert_eq!(readline.name(), "readline");
        assert_eq!(readline.changelogs()[1].version.as_deref(), Some("6.0-3"));
    }

    #[test]
    fn test_cached_documents_are_reused() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::repository());

        let first = PackageList::from_url(
            REPO_URL,
            cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher),
        )
        .unwrap();
        let calls = fetcher.total_calls();
        assert_eq!(calls, 2);

        let second = PackageList::from_url(
            REPO_URL,
            cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher),
        )
        .unwrap();
        assert_eq!(fetcher.total_calls(), calls);
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_expired_documents_are_refreshed() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::repository());
        let cache = cache_store(dir.path(), Duration::from_secs(60), true, &fetcher);
        let location = RepositoryLocation::new(REPO_URL).unwrap();
        let primary_url = format!("{REPO_URL}/{PRIMARY_HREF}");

        PackageList::new(location.clone(), cache.clone()).unwrap();
        let entry = cache.entry_path(&location.cache_key(), "primary.xml.gz");
        let old = FileTime::from_unix_time(FileTime::now().unix_seconds() - 3600, 0);
        filetime::set_file_mtime(&entry, old).unwrap();

        let list = PackageList::new(location, cache).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(fetcher.calls(&primary_url), 2);
    }

    #[test]
    fn test_disabled_cache_gives_identical_results() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cache");
        let fetcher = Arc::new(MockFetcher::repository());

        let first = PackageList::from_url(
            REPO_URL,
            cache_store(&root, Duration::from_secs(3600), false, &fetcher),
        )
        .unwrap();
        let second = PackageList::from_url(
            REPO_URL,
            cache_store(&root, Duration::from_secs(3600), false, &fetcher),
        )
        .unwrap();

        assert_eq!(names(&first), names(&second));
        assert_eq!(fetcher.total_calls(), 4);
        assert!(!root.exists());
    }

    #[test]
    fn test_missing_role() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::repository());
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);
        let location = RepositoryLocation::new(REPO_URL).unwrap();

        let mut resolver = ManifestResolver::new(location, cache).unwrap();

        #[derive(Debug)]
        struct Filelist;
        impl Record for Filelist {
            const ROLE: &'static str = "filelists";

            fn from_fragment(_: RecordFragment) -> Self {
                Filelist
            }
        }

        let err = RecordList::<Filelist>::from_resolver(&mut resolver).unwrap_err();
        assert!(matches!(err, RegistryError::RoleNotFound(role) if role == "filelists"));
    }

    #[test]
    fn test_empty_document() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(
            MockFetcher::repository().with(
                format!("{REPO_URL}/{OTHER_HREF}"),
                gzip(br#"<otherdata xmlns="http://linux.duke.edu/metadata/other" packages="0"/>"#),
            ),
        );
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);

        let list = PackageChangelogList::from_url(REPO_URL, cache).unwrap();
        assert!(list.is_empty());
        assert!(list.all().first().is_none());
    }

    #[test]
    fn test_corrupt_document() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(
            MockFetcher::repository()
                .with(format!("{REPO_URL}/{PRIMARY_HREF}"), gzip(b"<metadata><package>")),
        );
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);
        let location = RepositoryLocation::new(REPO_URL).unwrap();

        let mut resolver = ManifestResolver::new(location, cache).unwrap();
        let err = PackageList::from_resolver(&mut resolver).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MetadataParse { document, .. } if document == "primary.xml.gz"
        ));
        assert!(!resolver.close("primary"));
    }

    fn load_primary(xml: &[u8]) -> Result<PackageList> {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(
            MockFetcher::repository().with(format!("{REPO_URL}/{PRIMARY_HREF}"), gzip(xml)),
        );
        let cache = cache_store(dir.path(), Duration::from_secs(3600), true, &fetcher);
        let location = RepositoryLocation::new(REPO_URL).unwrap();

        let mut resolver = ManifestResolver::new(location, cache).unwrap();
        PackageList::from_resolver(&mut resolver)
    }

    #[test]
    fn test_truncated_document_is_rejected() {
        let err = load_primary(
            b"<metadata packages=\"3\"><package><name>a</name></package><package><name>b</name></package>",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MetadataParse { document, .. } if document == "primary.xml.gz"
        ));
    }

    #[test]
    fn test_trailing_records_are_rejected() {
        let err = load_primary(
            b"<metadata packages=\"1\"><package><name>a</name></package></metadata><package><name>junk</name></package>",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MetadataParse { document, .. } if document == "primary.xml.gz"
        ));
    }
}
