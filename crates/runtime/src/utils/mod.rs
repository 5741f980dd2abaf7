mod recent;

pub(crate) use recent::RecentSet;
